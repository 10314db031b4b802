//! Per-request context

use crate::utils::generate_request_id;

/// Correlation data handed explicitly to everything that logs on behalf of
/// one inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// A context with a freshly generated request id
    pub fn generate() -> Self {
        Self::new(generate_request_id())
    }
}
