//! Application configuration options

use std::collections::HashMap;
use std::time::Duration;

use crate::storage::settings::Settings;

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Nomad API configuration
    pub nomad: NomadOptions,

    /// Image repository to job names
    pub jobs: HashMap<String, Vec<String>>,
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            lifecycle: LifecycleOptions {
                max_shutdown_delay: Duration::from_secs(settings.server.shutdown_timeout_secs),
            },
            server: ServerOptions {
                address: settings.server.address.clone(),
                request_timeout: Duration::from_secs(settings.server.request_timeout_secs),
                log_requests: settings.server.log_requests,
            },
            nomad: NomadOptions {
                base_url: settings.nomad.url.clone(),
                timeout: Duration::from_secs(settings.nomad.timeout_secs),
            },
            jobs: settings.jobs.clone(),
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Inbound HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Address to bind to
    pub address: String,

    /// Requests running longer than this are cut off
    pub request_timeout: Duration,

    /// Log every handled request
    pub log_requests: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8000".to_string(),
            request_timeout: Duration::from_secs(10),
            log_requests: true,
        }
    }
}

/// Nomad API options
#[derive(Debug, Clone)]
pub struct NomadOptions {
    pub base_url: String,

    /// Deadline for each call
    pub timeout: Duration,
}

impl Default for NomadOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4646".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}
