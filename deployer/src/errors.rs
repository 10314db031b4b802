//! Error types for the deployer

use nomad_api::DocumentError;
use reqwest::StatusCode;
use thiserror::Error;

/// Process-level error type
#[derive(Error, Debug)]
pub enum DeployerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

/// Failure talking to the Nomad API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection failure, per-call deadline exceeded or broken body
    #[error("nomad api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("nomad api bad response code {status} while {operation} job: {body}")]
    Status {
        status: StatusCode,
        operation: &'static str,
        body: String,
    },

    #[error(transparent)]
    Decode(#[from] DocumentError),
}

impl ClientError {
    /// Status code returned by Nomad, if the request got that far
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            ClientError::Decode(_) => None,
        }
    }
}

/// Failure redeploying a single job
#[derive(Error, Debug)]
pub enum RedeployError {
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The job definition has no `Meta.VERSION` marker to patch
    #[error("job '{job}' definition lacks meta version")]
    VersionNotSupported { job: String },

    #[error("job '{job}' definition lacks a modify index")]
    MissingModifyIndex { job: String },
}

/// Job-level failure that aborted a notification batch
#[derive(Error, Debug)]
#[error("redeploy of job '{job}' after push of '{repository}:{tag}' failed: {source}")]
pub struct DispatchError {
    pub job: String,
    pub repository: String,
    pub tag: String,
    #[source]
    pub source: RedeployError,
}
