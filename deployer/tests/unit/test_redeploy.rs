//! Redeploy service tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use deployer::errors::{ClientError, RedeployError};
use deployer::http::client::HttpClient;
use deployer::http::nomad::JobsApi;
use deployer::models::context::RequestContext;
use deployer::models::job::{Job, RedeployRequest};
use deployer::redeploy::service::{RedeployService, Redeployer};
use nomad_api::JobDocument;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use crate::support::FakeNomad;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fetch(String),
    Submit {
        job: String,
        precondition_index: u64,
        document: Value,
    },
}

/// Serves one fixed document and records every call
struct MockJobsApi {
    document: &'static str,
    fetch_status: Option<StatusCode>,
    submit_status: Option<StatusCode>,
    calls: Mutex<Vec<Call>>,
}

impl MockJobsApi {
    fn new(document: &'static str) -> Self {
        Self {
            document,
            fetch_status: None,
            submit_status: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_fetch(mut self, status: StatusCode) -> Self {
        self.fetch_status = Some(status);
        self
    }

    fn failing_submit(mut self, status: StatusCode) -> Self {
        self.submit_status = Some(status);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn submits(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Submit { .. }))
            .count()
    }
}

fn status_error(status: StatusCode, operation: &'static str) -> ClientError {
    ClientError::Status {
        status,
        operation,
        body: String::new(),
    }
}

#[async_trait]
impl JobsApi for MockJobsApi {
    async fn fetch_job(&self, job_name: &str) -> Result<JobDocument, ClientError> {
        self.calls.lock().unwrap().push(Call::Fetch(job_name.to_string()));
        if let Some(status) = self.fetch_status {
            return Err(status_error(status, "reading"));
        }
        Ok(JobDocument::decode(self.document.as_bytes())?)
    }

    async fn submit_job(
        &self,
        job_name: &str,
        job: &JobDocument,
        precondition_index: u64,
    ) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Submit {
            job: job_name.to_string(),
            precondition_index,
            document: serde_json::from_slice(&job.encode()?).unwrap(),
        });
        match self.submit_status {
            Some(status) => Err(status_error(status, "registering")),
            None => Ok(()),
        }
    }
}

fn ctx() -> RequestContext {
    RequestContext::new("test-request")
}

#[tokio::test]
async fn test_redeploy_patches_version_only() {
    let api = Arc::new(MockJobsApi::new(
        r#"{"Meta":{"VERSION":"v1"},"JobModifyIndex":7,"Extra":{"x":1}}"#,
    ));
    let service = RedeployService::new(api.clone());

    let result = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await;

    assert_ok!(result);
    assert_eq!(
        api.calls(),
        vec![
            Call::Fetch("api-job".to_string()),
            Call::Submit {
                job: "api-job".to_string(),
                precondition_index: 7,
                document: json!({"Meta": {"VERSION": "v2"}, "JobModifyIndex": 7, "Extra": {"x": 1}}),
            },
        ]
    );
}

#[tokio::test]
async fn test_precondition_is_the_fetched_index() {
    let api = Arc::new(MockJobsApi::new(
        r#"{"Meta":{"VERSION":"1.0.0"},"JobModifyIndex":18446744073709551000}"#,
    ));
    let service = RedeployService::new(api.clone());

    service
        .redeploy(&ctx(), &Job::new("batch"), &RedeployRequest::new("1.0.1"))
        .await
        .unwrap();

    match &api.calls()[1] {
        Call::Submit {
            precondition_index,
            document,
            ..
        } => {
            assert_eq!(*precondition_index, 18446744073709551000);
            assert_eq!(document["JobModifyIndex"], json!(18446744073709551000u64));
        }
        other => panic!("expected a submit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_version_is_not_supported() {
    let api = Arc::new(MockJobsApi::new(
        r#"{"Meta":{"owner":"team-a"},"JobModifyIndex":7}"#,
    ));
    let service = RedeployService::new(api.clone());

    let err = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, RedeployError::VersionNotSupported { ref job } if job == "api-job"));
    assert_eq!(api.submits(), 0);
}

#[tokio::test]
async fn test_missing_meta_is_not_supported() {
    let api = Arc::new(MockJobsApi::new(r#"{"JobModifyIndex":7}"#));
    let service = RedeployService::new(api.clone());

    let err = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, RedeployError::VersionNotSupported { .. }));
    assert_eq!(api.submits(), 0);
}

#[tokio::test]
async fn test_missing_modify_index_is_refused() {
    let api = Arc::new(MockJobsApi::new(r#"{"Meta":{"VERSION":"v1"}}"#));
    let service = RedeployService::new(api.clone());

    let err = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, RedeployError::MissingModifyIndex { .. }));
    assert_eq!(api.submits(), 0);
}

#[tokio::test]
async fn test_fetch_failure_is_transport() {
    let api = Arc::new(
        MockJobsApi::new(r#"{"Meta":{"VERSION":"v1"},"JobModifyIndex":7}"#)
            .failing_fetch(StatusCode::NOT_FOUND),
    );
    let service = RedeployService::new(api.clone());

    let err = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await
        .unwrap_err();

    match err {
        RedeployError::Transport(client_err) => {
            assert_eq!(client_err.status(), Some(StatusCode::NOT_FOUND))
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(api.submits(), 0);
}

#[tokio::test]
async fn test_decode_failure_is_transport() {
    let api = Arc::new(MockJobsApi::new(r#"{"Meta":["v1"]}"#));
    let service = RedeployService::new(api.clone());

    let err = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, RedeployError::Transport(ClientError::Decode(_))));
    assert_eq!(api.submits(), 0);
}

#[tokio::test]
async fn test_submit_failure_is_transport() {
    let api = Arc::new(
        MockJobsApi::new(r#"{"Meta":{"VERSION":"v1"},"JobModifyIndex":7}"#)
            .failing_submit(StatusCode::INTERNAL_SERVER_ERROR),
    );
    let service = RedeployService::new(api.clone());

    let result = service
        .redeploy(&ctx(), &Job::new("api-job"), &RedeployRequest::new("v2"))
        .await;

    assert!(matches!(
        result,
        Err(RedeployError::Transport(ClientError::Status { .. }))
    ));
    assert_eq!(api.submits(), 1);
}

#[tokio::test]
async fn test_consecutive_redeploys_refetch() {
    let nomad = FakeNomad::start(&[(
        "api-job",
        r#"{"ID":"api-job","Meta":{"VERSION":"v1","owner":"team-a"},"JobModifyIndex":7}"#,
    )])
    .await;
    let client = HttpClient::new(&nomad.base_url, Duration::from_secs(5)).unwrap();
    let service = RedeployService::new(Arc::new(client));
    let job = Job::new("api-job");

    service
        .redeploy(&ctx(), &job, &RedeployRequest::new("v2"))
        .await
        .unwrap();
    service
        .redeploy(&ctx(), &job, &RedeployRequest::new("v3"))
        .await
        .unwrap();

    assert_eq!(nomad.reads().len(), 2);
    assert_eq!(
        nomad.job("api-job").unwrap(),
        json!({"ID": "api-job", "Meta": {"VERSION": "v3", "owner": "team-a"}, "JobModifyIndex": 9})
    );
}
