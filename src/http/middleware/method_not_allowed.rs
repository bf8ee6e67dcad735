//! Method-not-allowed guard.
//!
//! Runs when routing found no (method, path) match. A path the application
//! owns gets 405 with no body; anything else continues to the next stage.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::observability::metrics;
use crate::routing::KnownPaths;

pub async fn method_not_allowed_middleware(
    State(known_paths): State<Arc<KnownPaths>>,
    request: Request,
    next: Next,
) -> Response {
    // The router attaches the matched template when only the method failed.
    let template_known = request
        .extensions()
        .get::<MatchedPath>()
        .is_some_and(|matched| known_paths.contains(matched.as_str()));

    if template_known || known_paths.contains(request.uri().path()) {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Known path, method not allowed"
        );
        metrics::record_method_not_allowed();
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    next.run(request).await
}

/// Final stage for unmatched requests.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
