//! Application composition.
//!
//! # Data Flow
//! ```text
//! AppBuilder { module factories, status handlers, negotiators, options }
//!     → RouteTable::build (collect keys, reject duplicates)
//!     → one RouteDispatcher per key, grouped by path into axum MethodRouters
//!     → unmatched requests: 405 guard → 404
//!     → optional global hook layer around everything
//!     → App { router, table }
//! ```
//!
//! # Design Decisions
//! - Composition happens once; the resulting table is immutable
//! - Errors that axum would panic on are reported as [`CompositionError`]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::Request,
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{MethodFilter, MethodRouter},
    Router,
};

use crate::dispatch::{RouteDispatcher, StatusCodeHandler, StatusCodeHandlers};
use crate::error::CompositionError;
use crate::http::middleware::{
    global_hooks_middleware, method_not_allowed_middleware, not_found, GlobalHookState, Options,
};
use crate::http::{HttpContext, Negotiators, ResponseNegotiator};
use crate::module::{HookFuture, Module, ModuleFactory};
use crate::routing::RouteTable;
use crate::services::{Services, DEFAULT_BODY_LIMIT};

/// Collects everything an application is made of.
pub struct AppBuilder {
    modules: Vec<ModuleFactory>,
    status_handlers: StatusCodeHandlers,
    negotiators: Vec<Arc<dyn ResponseNegotiator>>,
    options: Options,
    body_limit: usize,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            status_handlers: StatusCodeHandlers::new(),
            negotiators: Vec::new(),
            options: Options::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Register a module. The factory runs once during composition and once
    /// per request routed to the module.
    pub fn module<F>(mut self, make: F) -> Self
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        self.modules.push(ModuleFactory::new(make));
        self
    }

    /// Register a status-code handler. Earlier registrations win.
    pub fn status_handler<T>(mut self, handler: T) -> Self
    where
        T: StatusCodeHandler + 'static,
    {
        self.status_handlers.push(handler);
        self
    }

    pub fn on_status<P, H>(mut self, predicate: P, handler: H) -> Self
    where
        P: Fn(StatusCode) -> bool + Send + Sync + 'static,
        H: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.status_handlers.on(predicate, handler);
        self
    }

    /// Add a response negotiator, consulted before the JSON fallback.
    pub fn negotiator<N>(mut self, negotiator: N) -> Self
    where
        N: ResponseNegotiator + 'static,
    {
        self.negotiators.push(Arc::new(negotiator));
        self
    }

    /// Global hooks around the routing stage.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Largest request body a handler may read.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Compose the router.
    pub fn build(self) -> Result<App, CompositionError> {
        let table = RouteTable::build(self.modules)?;
        let services = Arc::new(Services::new(
            self.status_handlers,
            Negotiators::new(self.negotiators),
            self.body_limit,
        ));
        let known_paths = Arc::new(table.known_paths().clone());

        let unmatched = not_found.layer(from_fn_with_state(
            Arc::clone(&known_paths),
            method_not_allowed_middleware,
        ));

        let mut by_path: BTreeMap<&str, MethodRouter> = BTreeMap::new();
        for entry in table.entries() {
            let key = entry.key();
            let filter = MethodFilter::try_from(key.method().clone())
                .map_err(|_| CompositionError::UnsupportedMethod { key: key.clone() })?;

            let dispatcher = RouteDispatcher::new(Arc::clone(entry), Arc::clone(&services));
            let method_router = by_path
                .remove(key.path())
                .unwrap_or_else(|| MethodRouter::new().fallback(unmatched.clone()));
            by_path.insert(
                key.path(),
                method_router.on(filter, move |request: Request| dispatcher.clone().handle(request)),
            );

            tracing::trace!(route = %key, module = %entry.module(), "Route mounted");
        }

        let mut router = Router::new();
        for (path, method_router) in by_path {
            router = router.route(path, method_router);
        }
        router = router.fallback(unmatched);

        if !self.options.is_empty() {
            router = router.layer(from_fn_with_state(
                GlobalHookState {
                    options: self.options,
                    services: Arc::clone(&services),
                },
                global_hooks_middleware,
            ));
        }

        tracing::info!(
            routes = table.len(),
            paths = known_paths.len(),
            "Application composed"
        );

        Ok(App {
            router,
            table: Arc::new(table),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A composed application, ready to be hosted.
pub struct App {
    router: Router,
    table: Arc<RouteTable>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.table
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
