//! Application state management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::DeployerError;
use crate::http::client::HttpClient;
use crate::redeploy::dispatcher::NotificationDispatcher;
use crate::redeploy::service::RedeployService;
use crate::storage::jobs::InMemoryJobsRepository;

/// Readiness flag reported by `/health`
#[derive(Debug, Default)]
pub struct HealthTracker {
    healthy: AtomicBool,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Main application state
pub struct AppState {
    /// Notification dispatcher, wired to Nomad and the job mapping
    pub dispatcher: Arc<NotificationDispatcher>,

    /// Readiness flag
    pub health: Arc<HealthTracker>,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Self, DeployerError> {
        info!("Initializing application state...");

        let jobs_repository = Arc::new(InMemoryJobsRepository::from_job_names(&options.jobs));
        info!("Loaded job mapping for {} image repositories", jobs_repository.len());

        let http_client = Arc::new(HttpClient::new(
            &options.nomad.base_url,
            options.nomad.timeout,
        )?);
        info!("Using Nomad API at {}", http_client.base_url());

        let redeploy_service = Arc::new(RedeployService::new(http_client));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            jobs_repository,
            redeploy_service,
        ));

        Ok(Self {
            dispatcher,
            health: Arc::new(HealthTracker::new()),
        })
    }
}
