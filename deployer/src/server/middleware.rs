//! Request id propagation

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use ::http::{HeaderName, HeaderValue};

use crate::utils::generate_request_id;

/// Header carrying the request id, both ways
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id attached to request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuse the caller's `X-Request-Id` or generate one, expose it to handlers
/// and echo it on the response
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
