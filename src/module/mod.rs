//! Module declarations.
//!
//! # Data Flow
//! ```text
//! ModuleFactory (registered once at startup)
//!     → called once during composition (route keys read, instance dropped)
//!     → called again for every request that hits one of its routes
//!     → Module { routes, before, after } owned by that request only
//! ```
//!
//! # Design Decisions
//! - Explicit registration instead of type scanning
//! - Shared state is captured by the factory closure, never by the module instance
//! - Hooks are optional; an absent hook is skipped, not replaced by a no-op

pub mod handler;

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;

use crate::routing::key::RouteKey;

pub use handler::{AfterFn, BeforeFn, HandlerFn, HookFuture};

use crate::http::HttpContext;

/// A group of routes plus optional request-scoped hooks.
pub struct Module {
    name: String,
    routes: HashMap<RouteKey, Box<HandlerFn>>,
    before: Option<Box<BeforeFn>>,
    after: Option<Box<AfterFn>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: HashMap::new(),
            before: None,
            after: None,
        }
    }

    /// Declare a route. Declaring the same key twice keeps the last handler.
    pub fn route<F>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        let key = RouteKey::new(method, path);
        if self.routes.insert(key.clone(), Box::new(handler)).is_some() {
            tracing::warn!(module = %self.name, route = %key, "Route declared twice, keeping the last handler");
        }
        self
    }

    pub fn get<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn patch<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    pub fn delete<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Set the module's Before hook. Returning `false` skips the handler and the After hook.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, bool> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Set the module's After hook. Runs only after a successful handler.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared route keys, in no particular order.
    pub fn route_keys(&self) -> impl Iterator<Item = &RouteKey> {
        self.routes.keys()
    }

    pub fn handler(&self, key: &RouteKey) -> Option<&HandlerFn> {
        self.routes.get(key).map(|h| h.as_ref())
    }

    pub fn before_hook(&self) -> Option<&BeforeFn> {
        self.before.as_deref()
    }

    pub fn after_hook(&self) -> Option<&AfterFn> {
        self.after.as_deref()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Produces a fresh [`Module`] per request.
pub struct ModuleFactory {
    make: Box<dyn Fn() -> Module + Send + Sync>,
}

impl ModuleFactory {
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        Self {
            make: Box::new(make),
        }
    }

    pub fn create(&self) -> Module {
        (self.make)()
    }
}

impl fmt::Debug for ModuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModuleFactory { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ctx: &mut HttpContext) -> HookFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn allow(_ctx: &mut HttpContext) -> HookFuture<'_, bool> {
        Box::pin(async { Ok(true) })
    }

    #[test]
    fn test_module_declares_routes() {
        let module = Module::new("notes")
            .get("/notes", noop)
            .post("/notes", noop)
            .delete("notes/{id}", noop);

        assert_eq!(module.name(), "notes");
        assert_eq!(module.route_keys().count(), 3);
        assert!(module.handler(&RouteKey::new(Method::GET, "/notes")).is_some());
        assert!(module.handler(&RouteKey::new(Method::DELETE, "/notes/{id}")).is_some());
        assert!(module.handler(&RouteKey::new(Method::PUT, "/notes")).is_none());
    }

    #[test]
    fn test_hooks_are_optional() {
        let module = Module::new("bare").get("/", noop);
        assert!(module.before_hook().is_none());
        assert!(module.after_hook().is_none());

        let module = Module::new("hooked").before(allow).after(noop);
        assert!(module.before_hook().is_some());
        assert!(module.after_hook().is_some());
    }

    #[test]
    fn test_redeclared_route_replaces() {
        let module = Module::new("dup").get("/a", noop).get("/a", noop);
        assert_eq!(module.route_keys().count(), 1);
    }

    #[test]
    fn test_factory_creates_fresh_instances() {
        let factory = ModuleFactory::new(|| Module::new("fresh").put("/x", noop).patch("/x", noop));
        let first = factory.create();
        let second = factory.create();
        assert_eq!(first.route_keys().count(), 2);
        assert_eq!(second.route_keys().count(), 2);
    }
}
