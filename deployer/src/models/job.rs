//! Job routing models

use serde::{Deserialize, Serialize};

/// A Nomad job, addressed by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Intent to move one job to a new version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeployRequest {
    pub new_version: String,
}

impl RedeployRequest {
    pub fn new(new_version: impl Into<String>) -> Self {
        Self {
            new_version: new_version.into(),
        }
    }
}
