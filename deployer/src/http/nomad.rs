//! Nomad jobs API client

use async_trait::async_trait;
use nomad_api::{DocumentError, JobDocument, JobRegisterRequest};

use crate::errors::ClientError;
use crate::http::client::HttpClient;

/// Read and conditionally write Nomad job definitions.
///
/// Each call is exactly one request against Nomad; nothing is cached between
/// calls and nothing is retried.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Fetch the current definition of `job_name`
    async fn fetch_job(&self, job_name: &str) -> Result<JobDocument, ClientError>;

    /// Register `job` under `job_name`, provided Nomad's current modify index
    /// for it still equals `precondition_index`
    async fn submit_job(
        &self,
        job_name: &str,
        job: &JobDocument,
        precondition_index: u64,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl JobsApi for HttpClient {
    async fn fetch_job(&self, job_name: &str) -> Result<JobDocument, ClientError> {
        let url = self.url(&["v1", "job", job_name]);
        let body = self.get_bytes(url, "reading").await?;
        Ok(JobDocument::decode(&body)?)
    }

    async fn submit_job(
        &self,
        job_name: &str,
        job: &JobDocument,
        precondition_index: u64,
    ) -> Result<(), ClientError> {
        let url = self.url(&["v1", "job", job_name]);
        let request = JobRegisterRequest::enforcing(job, precondition_index);
        let body = serde_json::to_vec(&request).map_err(DocumentError::Encode)?;
        self.post_json(url, body, "registering").await
    }
}
