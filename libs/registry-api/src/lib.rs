//! Registry notification models
//!
//! Wire types for the notification envelope a container registry posts to
//! its configured endpoints, and for the deployer's own informational routes.

pub mod models;

pub use models::{Event, Notifications, Target, VersionResponse, ACTION_PUSH};
