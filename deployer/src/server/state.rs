//! Server state

use std::sync::Arc;

use crate::app::state::HealthTracker;
use crate::redeploy::dispatcher::NotificationDispatcher;

/// Server state shared across handlers
pub struct ServerState {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub health: Arc<HealthTracker>,
}

impl ServerState {
    pub fn new(dispatcher: Arc<NotificationDispatcher>, health: Arc<HealthTracker>) -> Self {
        Self { dispatcher, health }
    }
}
