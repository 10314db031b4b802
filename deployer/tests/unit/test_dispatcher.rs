//! Notification dispatch tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deployer::errors::RedeployError;
use deployer::models::context::RequestContext;
use deployer::models::job::{Job, RedeployRequest};
use deployer::redeploy::dispatcher::NotificationDispatcher;
use deployer::redeploy::service::Redeployer;
use deployer::storage::jobs::InMemoryJobsRepository;
use registry_api::{Event, Target};

/// Records every redeploy and fails for a configured set of jobs
#[derive(Default)]
struct MockRedeployer {
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockRedeployer {
    fn failing_for(jobs: &[&str]) -> Self {
        Self {
            failing: jobs.iter().map(|job| job.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Redeployer for MockRedeployer {
    async fn redeploy(
        &self,
        _ctx: &RequestContext,
        job: &Job,
        request: &RedeployRequest,
    ) -> Result<(), RedeployError> {
        self.calls
            .lock()
            .unwrap()
            .push((job.name.clone(), request.new_version.clone()));

        if self.failing.contains(&job.name) {
            return Err(RedeployError::VersionNotSupported {
                job: job.name.clone(),
            });
        }
        Ok(())
    }
}

fn push(repository: &str, tag: &str) -> Event {
    event("push", repository, tag)
}

fn event(action: &str, repository: &str, tag: &str) -> Event {
    Event {
        action: action.to_string(),
        target: Target {
            repository: repository.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// `table` lists (repository, job) pairs in configuration order
fn dispatcher(table: &[(&str, &str)], redeployer: Arc<MockRedeployer>) -> NotificationDispatcher {
    let mut mapping: HashMap<String, Vec<String>> = HashMap::new();
    for (repository, job) in table {
        mapping
            .entry(repository.to_string())
            .or_default()
            .push(job.to_string());
    }
    NotificationDispatcher::new(
        Arc::new(InMemoryJobsRepository::from_job_names(&mapping)),
        redeployer,
    )
}

fn calls(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(job, version)| (job.to_string(), version.to_string()))
        .collect()
}

#[tokio::test]
async fn test_tagged_push_redeploys_every_mapped_job_in_order() {
    let redeployer = Arc::new(MockRedeployer::default());
    let dispatcher = dispatcher(
        &[
            ("app/api", "api-job"),
            ("app/api", "api-worker"),
            ("app/web", "web"),
        ],
        redeployer.clone(),
    );

    let redeployed = dispatcher
        .dispatch(
            &RequestContext::generate(),
            &[push("app/web", "2.0.0"), push("app/api", "1.4.2")],
        )
        .await
        .unwrap();

    assert_eq!(redeployed, 3);
    assert_eq!(
        redeployer.calls(),
        calls(&[("web", "2.0.0"), ("api-job", "1.4.2"), ("api-worker", "1.4.2")])
    );
}

#[tokio::test]
async fn test_events_without_tagged_push_are_skipped() {
    let redeployer = Arc::new(MockRedeployer::default());
    let dispatcher = dispatcher(&[("app/api", "api-job")], redeployer.clone());

    let events = [
        push("app/api", ""),
        event("pull", "app/api", "1.0.0"),
        event("delete", "app/api", "1.0.0"),
        push("app/unknown", "1.0.0"),
    ];
    let redeployed = dispatcher
        .dispatch(&RequestContext::generate(), &events)
        .await
        .unwrap();

    assert_eq!(redeployed, 0);
    assert!(redeployer.calls().is_empty());
}

#[tokio::test]
async fn test_empty_batch_is_ok() {
    let redeployer = Arc::new(MockRedeployer::default());
    let dispatcher = dispatcher(&[("app/api", "api-job")], redeployer.clone());

    let redeployed = dispatcher
        .dispatch(&RequestContext::generate(), &[])
        .await
        .unwrap();

    assert_eq!(redeployed, 0);
}

#[tokio::test]
async fn test_failure_aborts_remaining_events() {
    let redeployer = Arc::new(MockRedeployer::failing_for(&["b"]));
    let dispatcher = dispatcher(
        &[("app/a", "a"), ("app/b", "b"), ("app/c", "c")],
        redeployer.clone(),
    );

    let err = dispatcher
        .dispatch(
            &RequestContext::generate(),
            &[push("app/a", "v1"), push("app/b", "v2"), push("app/c", "v3")],
        )
        .await
        .unwrap_err();

    assert_eq!(err.job, "b");
    assert_eq!(err.repository, "app/b");
    assert_eq!(err.tag, "v2");
    assert!(matches!(err.source, RedeployError::VersionNotSupported { .. }));
    assert_eq!(redeployer.calls(), calls(&[("a", "v1"), ("b", "v2")]));
}

#[tokio::test]
async fn test_failure_aborts_remaining_jobs_of_the_event() {
    let redeployer = Arc::new(MockRedeployer::failing_for(&["api-job"]));
    let dispatcher = dispatcher(
        &[("app/api", "api-job"), ("app/api", "api-worker")],
        redeployer.clone(),
    );

    let err = dispatcher
        .dispatch(&RequestContext::generate(), &[push("app/api", "1.4.2")])
        .await
        .unwrap_err();

    assert_eq!(err.job, "api-job");
    assert_eq!(redeployer.calls(), calls(&[("api-job", "1.4.2")]));
}

#[tokio::test]
async fn test_error_message_names_job_and_image() {
    let redeployer = Arc::new(MockRedeployer::failing_for(&["api-job"]));
    let dispatcher = dispatcher(&[("app/api", "api-job")], redeployer);

    let err = dispatcher
        .dispatch(&RequestContext::generate(), &[push("app/api", "1.4.2")])
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("api-job"));
    assert!(message.contains("app/api:1.4.2"));
}
