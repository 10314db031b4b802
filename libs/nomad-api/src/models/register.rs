//! Job register request

use serde::Serialize;

use super::job::JobDocument;

/// Body of `POST /v1/job/:job_id`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRegisterRequest<'a> {
    pub job: &'a JobDocument,

    /// Ask Nomad to reject the write unless its current index matches
    pub enforce_index: bool,

    pub job_modify_index: u64,
}

impl<'a> JobRegisterRequest<'a> {
    /// Register `job` only if the remote copy is still at `job_modify_index`
    pub fn enforcing(job: &'a JobDocument, job_modify_index: u64) -> Self {
        Self {
            job,
            enforce_index: true,
            job_modify_index,
        }
    }
}
