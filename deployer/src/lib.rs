//! Nomad Deployer Library
//!
//! Core modules for redeploying Nomad jobs on registry pushes.

pub mod app;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod redeploy;
pub mod server;
pub mod storage;
pub mod utils;
