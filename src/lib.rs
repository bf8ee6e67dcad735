//! Module router library.
//!
//! Applications are assembled from modules: groups of routes with optional
//! request-scoped Before/After hooks. Every request gets a fresh module
//! instance, runs through the module pipeline and then through the first
//! status-code handler that accepts the resulting status.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod module;
pub mod observability;
pub mod routing;
pub mod services;

pub use app::{App, AppBuilder};
pub use config::ServerConfig;
pub use dispatch::{StatusCodeHandler, StatusCodeHandlers};
pub use error::{BodyError, CompositionError, DispatchError};
pub use http::middleware::Options;
pub use http::{HttpContext, HttpServer, JsonNegotiator, ResponseNegotiator};
pub use lifecycle::Shutdown;
pub use module::{HookFuture, Module};
pub use routing::RouteKey;
