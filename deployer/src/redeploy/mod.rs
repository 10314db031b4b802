//! Redeploy pipeline
//!
//! The dispatcher turns registry notifications into per-job redeploy
//! requests; the service applies one request to one Nomad job.

pub mod dispatcher;
pub mod service;
