//! Per-route dispatch.
//!
//! # Pipeline
//! ```text
//! fresh module instance (factory)
//!     → re-resolve handler by exact key (missing = fatal)
//!     → HEAD: redirect body into capture buffer
//!     → module Before (false = skip handler and After)
//!     → handler → module After
//!     → first status-code handler accepting the current status
//!     → HEAD: measure, discard, set Content-Length
//! ```
//!
//! # Design Decisions
//! - Failures propagate unchanged; the host decides the status code
//! - No timeout of its own; cancellation belongs to the host
//! - HEAD buffering cost equals the GET body size

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};

use crate::error::{DispatchError, HookScope};
use crate::http::HttpContext;
use crate::observability::metrics;
use crate::routing::RouteEntry;
use crate::services::Services;

/// The function installed for one route.
#[derive(Clone)]
pub struct RouteDispatcher {
    entry: Arc<RouteEntry>,
    services: Arc<Services>,
}

impl RouteDispatcher {
    pub fn new(entry: Arc<RouteEntry>, services: Arc<Services>) -> Self {
        Self { entry, services }
    }

    pub fn entry(&self) -> &RouteEntry {
        &self.entry
    }

    /// Run the route pipeline against a context.
    pub async fn dispatch(&self, ctx: &mut HttpContext) -> Result<(), DispatchError> {
        let key = self.entry.key();
        let module = self.entry.factory().create();
        let handler = module
            .handler(key)
            .ok_or_else(|| DispatchError::RouteVanished {
                key: key.clone(),
                module: self.entry.module().to_string(),
            })?;

        let head = ctx.method() == Method::HEAD;
        if head {
            ctx.response_mut().begin_capture();
        }

        let proceed = match module.before_hook() {
            Some(before) => before(ctx).await.map_err(|source| DispatchError::Before {
                scope: HookScope::Module(module.name().to_string()),
                source,
            })?,
            None => true,
        };

        if proceed {
            handler(ctx).await.map_err(|source| DispatchError::Handler {
                key: key.clone(),
                source,
            })?;

            if let Some(after) = module.after_hook() {
                after(ctx).await.map_err(|source| DispatchError::After {
                    scope: HookScope::Module(module.name().to_string()),
                    source,
                })?;
            }
        } else {
            tracing::debug!(module = %module.name(), route = %key, status = %ctx.status(), "Before hook stopped the request");
        }

        let status = ctx.status();
        if let Some(status_handler) = self.services.status_handlers().resolve(status) {
            status_handler
                .handle(ctx)
                .await
                .map_err(|source| DispatchError::StatusHandler { status, source })?;
        }

        if head {
            if let Some(len) = ctx.response_mut().finish_capture() {
                tracing::trace!(route = %key, content_length = len, "HEAD body discarded");
            }
        }

        Ok(())
    }

    /// Adapt the pipeline to the host: build the context, dispatch, convert.
    pub async fn handle(self, request: Request) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let route = self.entry.key().path().to_string();

        let mut ctx = HttpContext::from_request(request, Arc::clone(&self.services)).await;
        match self.dispatch(&mut ctx).await {
            Ok(()) => {
                metrics::record_request(&method, &route, ctx.status().as_u16(), start);
                ctx.into_response()
            }
            Err(e) => {
                tracing::error!(
                    method = %method,
                    route = %route,
                    module = %self.entry.module(),
                    error = %e,
                    "Dispatch failed"
                );
                metrics::record_dispatch_error(e.kind());
                let response = e.into_response();
                metrics::record_request(&method, &route, response.status().as_u16(), start);
                response
            }
        }
    }
}
