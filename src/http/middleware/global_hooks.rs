//! Process-wide Before/After hooks around the whole routing stage.
//!
//! ```text
//! global Before ──false──────────────────────────┐
//!      │ true                                    │
//!      ▼                                         ▼
//! router (routes, 405 guard, 404) ──────▶ global After ──▶ response
//! ```
//!
//! Installed only when at least one hook is configured.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{DispatchError, HookScope};
use crate::http::HttpContext;
use crate::module::{AfterFn, BeforeFn, HookFuture};
use crate::observability::metrics;
use crate::services::Services;

/// Global hooks supplied once at startup.
#[derive(Clone, Default)]
pub struct Options {
    before: Option<Arc<BeforeFn>>,
    after: Option<Arc<AfterFn>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before routing. Returning `false` skips routing entirely.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, bool> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Runs after the routing stage completes, whatever it produced.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// State for the global hook middleware.
#[derive(Clone)]
pub struct GlobalHookState {
    pub options: Options,
    pub services: Arc<Services>,
}

pub async fn global_hooks_middleware(
    State(state): State<GlobalHookState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match run_hooks(state, request, next).await {
        Ok(ctx) => ctx.into_response(),
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Global hook failed");
            metrics::record_dispatch_error(e.kind());
            e.into_response()
        }
    }
}

async fn run_hooks(
    state: GlobalHookState,
    request: Request,
    next: Next,
) -> Result<HttpContext, DispatchError> {
    let mut ctx = HttpContext::from_request(request, state.services).await;

    let proceed = match &state.options.before {
        Some(before) => before(&mut ctx).await.map_err(|source| DispatchError::Before {
            scope: HookScope::Global,
            source,
        })?,
        None => true,
    };

    let mut failure = None;
    if proceed {
        let (request, head, pending, services) = ctx.into_request();
        let downstream = next.run(request).await;
        (ctx, failure) = HttpContext::after_downstream(head, pending, downstream, services).await;
    } else {
        tracing::debug!(path = %ctx.path(), status = %ctx.status(), "Global before hook stopped the request");
    }

    if let Some(after) = &state.options.after {
        after(&mut ctx).await.map_err(|source| DispatchError::After {
            scope: HookScope::Global,
            source,
        })?;
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(ctx),
    }
}
