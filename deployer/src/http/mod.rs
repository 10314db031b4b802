//! Nomad HTTP API access

pub mod client;
pub mod nomad;
