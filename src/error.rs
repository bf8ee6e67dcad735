//! Error types for composition and dispatch.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use thiserror::Error;

use crate::routing::RouteKey;

/// Errors raised while composing the route table at startup.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// Two modules declared the same (method, path) key.
    #[error("Route {key} declared by both {first} and {second}")]
    DuplicateRoute {
        key: RouteKey,
        first: String,
        second: String,
    },

    /// The router cannot filter on this method (extension methods).
    #[error("Route {key} uses a method the router cannot dispatch on")]
    UnsupportedMethod { key: RouteKey },
}

/// Which scope a hook belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookScope {
    Global,
    Module(String),
}

impl fmt::Display for HookScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookScope::Global => f.write_str("global"),
            HookScope::Module(name) => write!(f, "module {name}"),
        }
    }
}

/// Errors reading or decoding a request or response body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Failed to read body: {0}")]
    Read(#[from] axum::Error),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while dispatching a single request.
///
/// Hook and handler failures are carried as their original error; nothing at
/// this layer converts them. The host maps them with [`IntoResponse`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A route compiled at startup is missing from a fresh module instance.
    #[error("Route {key} vanished from module {module}")]
    RouteVanished { key: RouteKey, module: String },

    #[error("Before hook ({scope}) failed: {source}")]
    Before {
        scope: HookScope,
        #[source]
        source: BoxError,
    },

    #[error("Handler for {key} failed: {source}")]
    Handler {
        key: RouteKey,
        #[source]
        source: BoxError,
    },

    #[error("After hook ({scope}) failed: {source}")]
    After {
        scope: HookScope,
        #[source]
        source: BoxError,
    },

    #[error("Status code handler for {status} failed: {source}")]
    StatusHandler {
        status: StatusCode,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Body(#[from] BodyError),
}

impl DispatchError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::RouteVanished { .. } => "route_vanished",
            DispatchError::Before { .. } => "before",
            DispatchError::Handler { .. } => "handler",
            DispatchError::After { .. } => "after",
            DispatchError::StatusHandler { .. } => "status_handler",
            DispatchError::Body(_) => "body",
        }
    }
}

/// Every dispatch failure is a server error with an empty body.
impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_failures_map_to_server_error() {
        let err = DispatchError::Handler {
            key: RouteKey::new(Method::GET, "/x"),
            source: "boom".into(),
        };
        assert_eq!(err.kind(), "handler");
        assert!(err.to_string().contains("GET /x"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = DispatchError::After {
            scope: HookScope::Module("notes".into()),
            source: "disk full".into(),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".to_string()));
        assert!(err.to_string().contains("module notes"));
    }

    #[test]
    fn test_body_failure_is_server_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DispatchError::from(BodyError::from(json_err));
        assert_eq!(err.kind(), "body");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
