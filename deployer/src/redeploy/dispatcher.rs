//! Registry notification dispatch

use std::sync::Arc;

use registry_api::Event;
use tracing::{debug, info};

use crate::errors::DispatchError;
use crate::models::context::RequestContext;
use crate::models::job::RedeployRequest;
use crate::redeploy::service::Redeployer;
use crate::storage::jobs::JobsRepository;

/// Maps registry events onto the jobs that run the pushed image
pub struct NotificationDispatcher {
    jobs_repository: Arc<dyn JobsRepository>,
    redeployer: Arc<dyn Redeployer>,
}

impl NotificationDispatcher {
    pub fn new(jobs_repository: Arc<dyn JobsRepository>, redeployer: Arc<dyn Redeployer>) -> Self {
        Self {
            jobs_repository,
            redeployer,
        }
    }

    /// Redeploy every job affected by a tagged push in `events`.
    ///
    /// Events and jobs are handled strictly in order. The first failing job
    /// aborts the whole batch: neither the rest of its event's jobs nor any
    /// later event is attempted. Untagged or non-push events and images no
    /// job uses are skipped.
    ///
    /// Returns the number of jobs redeployed.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        events: &[Event],
    ) -> Result<usize, DispatchError> {
        let mut redeployed = 0;

        for event in events {
            // layer uploads, pulls and deletes carry nothing to roll out
            if !event.is_push() || !event.has_tag() {
                debug!(
                    request_id = %ctx.request_id,
                    action = %event.action,
                    repository = %event.target.repository,
                    "Skipping event without a tagged push"
                );
                continue;
            }

            let repository = &event.target.repository;
            let tag = &event.target.tag;

            let jobs = self.jobs_repository.find_jobs_by_image(repository);
            if jobs.is_empty() {
                debug!(
                    request_id = %ctx.request_id,
                    repository = %repository,
                    tag = %tag,
                    "No jobs use image '{}', skipping", repository
                );
                continue;
            }

            let names: Vec<&str> = jobs.iter().map(|job| job.name.as_str()).collect();
            info!(
                request_id = %ctx.request_id,
                jobs = ?names,
                "Found {} jobs to redeploy after image '{}:{}' was pushed",
                jobs.len(), repository, tag
            );

            let request = RedeployRequest::new(tag.as_str());
            for job in &jobs {
                self.redeployer
                    .redeploy(ctx, job, &request)
                    .await
                    .map_err(|source| DispatchError {
                        job: job.name.clone(),
                        repository: repository.clone(),
                        tag: tag.clone(),
                        source,
                    })?;
                redeployed += 1;
            }
        }

        Ok(redeployed)
    }
}
