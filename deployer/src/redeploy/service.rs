//! Single job redeploy

use std::sync::Arc;

use async_trait::async_trait;
use nomad_api::JobDocument;
use tracing::{debug, info};

use crate::errors::RedeployError;
use crate::http::nomad::JobsApi;
use crate::models::context::RequestContext;
use crate::models::job::{Job, RedeployRequest};

/// Redeployer trait for testability
#[async_trait]
pub trait Redeployer: Send + Sync {
    /// Move `job` to `request.new_version`
    async fn redeploy(
        &self,
        ctx: &RequestContext,
        job: &Job,
        request: &RedeployRequest,
    ) -> Result<(), RedeployError>;
}

/// Redeploys a job by patching its `Meta.VERSION` marker.
///
/// One fetch, one conditional register. The register is guarded by the
/// modify index seen at fetch time, so a concurrent writer makes it fail
/// instead of being overwritten. A failed call is not retried; retrying
/// means starting over from a fresh fetch.
pub struct RedeployService {
    jobs_api: Arc<dyn JobsApi>,
}

impl RedeployService {
    pub fn new(jobs_api: Arc<dyn JobsApi>) -> Self {
        Self { jobs_api }
    }
}

#[async_trait]
impl Redeployer for RedeployService {
    async fn redeploy(
        &self,
        ctx: &RequestContext,
        job: &Job,
        request: &RedeployRequest,
    ) -> Result<(), RedeployError> {
        debug!(
            request_id = %ctx.request_id,
            job = %job.name,
            "Triggering redeploy of job '{}'", job.name
        );

        let mut document = self.jobs_api.fetch_job(&job.name).await?;

        let previous_version = patch_version(&mut document, job, &request.new_version)?;
        let Some(modify_index) = document.modify_index() else {
            return Err(RedeployError::MissingModifyIndex {
                job: job.name.clone(),
            });
        };

        self.jobs_api
            .submit_job(&job.name, &document, modify_index)
            .await?;

        info!(
            request_id = %ctx.request_id,
            job = %job.name,
            from = %previous_version,
            to = %request.new_version,
            modify_index,
            "Redeployment of job '{}' was successfully triggered", job.name
        );

        Ok(())
    }
}

/// Replace the job's version marker, returning the previous value. Jobs
/// without a marker (absent or null) are not supported.
fn patch_version(
    document: &mut JobDocument,
    job: &Job,
    new_version: &str,
) -> Result<String, RedeployError> {
    let not_supported = || RedeployError::VersionNotSupported {
        job: job.name.clone(),
    };

    let previous = document
        .version()
        .map(str::to_string)
        .ok_or_else(not_supported)?;
    document
        .set_version(new_version)
        .map_err(|_| not_supported())?;

    Ok(previous)
}
