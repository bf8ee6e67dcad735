//! Status-code handlers.
//!
//! After a route finishes, the first registered handler that accepts the
//! response status is invoked. Registration order is the priority order.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::http::HttpContext;
use crate::module::HookFuture;

/// A post-response interceptor selected by status code.
pub trait StatusCodeHandler: Send + Sync {
    fn can_handle(&self, status: StatusCode) -> bool;

    fn handle<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a, ()>;
}

/// Status-code handler built from a predicate and a handler function.
struct FnStatusHandler<P, H> {
    predicate: P,
    handler: H,
}

impl<P, H> StatusCodeHandler for FnStatusHandler<P, H>
where
    P: Fn(StatusCode) -> bool + Send + Sync,
    H: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync,
{
    fn can_handle(&self, status: StatusCode) -> bool {
        (self.predicate)(status)
    }

    fn handle<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a, ()> {
        (self.handler)(ctx)
    }
}

/// Ordered collection of status-code handlers.
#[derive(Clone, Default)]
pub struct StatusCodeHandlers {
    handlers: Vec<Arc<dyn StatusCodeHandler>>,
}

impl StatusCodeHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T>(&mut self, handler: T)
    where
        T: StatusCodeHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Register a handler from a predicate and a function.
    pub fn on<P, H>(&mut self, predicate: P, handler: H)
    where
        P: Fn(StatusCode) -> bool + Send + Sync + 'static,
        H: for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync + 'static,
    {
        self.push(FnStatusHandler { predicate, handler });
    }

    /// First handler, in registration order, that accepts `status`.
    pub fn resolve(&self, status: StatusCode) -> Option<&dyn StatusCodeHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(status))
            .map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for StatusCodeHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusCodeHandlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(&'static str, StatusCode);

    impl StatusCodeHandler for Tagged {
        fn can_handle(&self, status: StatusCode) -> bool {
            status == self.1
        }

        fn handle<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a, ()> {
            Box::pin(async move {
                ctx.write_str(self.0);
                Ok(())
            })
        }
    }

    fn tag(handler: &dyn StatusCodeHandler) -> bool {
        handler.can_handle(StatusCode::NOT_FOUND)
    }

    fn noop(_ctx: &mut HttpContext) -> HookFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn test_first_registered_wins() {
        let mut handlers = StatusCodeHandlers::new();
        handlers.push(Tagged("first", StatusCode::NOT_FOUND));
        handlers.push(Tagged("second", StatusCode::NOT_FOUND));

        let resolved = handlers.resolve(StatusCode::NOT_FOUND).unwrap();
        assert!(tag(resolved));
        assert!(std::ptr::addr_eq(
            resolved as *const dyn StatusCodeHandler,
            handlers.handlers[0].as_ref() as *const dyn StatusCodeHandler,
        ));
    }

    #[test]
    fn test_no_match_resolves_none() {
        let mut handlers = StatusCodeHandlers::new();
        handlers.on(|s| s.is_server_error(), noop);
        assert!(handlers.resolve(StatusCode::OK).is_none());
        assert!(handlers.resolve(StatusCode::BAD_GATEWAY).is_some());
        assert_eq!(handlers.len(), 1);
    }

    #[test]
    fn test_empty_resolves_none() {
        let handlers = StatusCodeHandlers::new();
        assert!(handlers.is_empty());
        assert!(handlers.resolve(StatusCode::NOT_FOUND).is_none());
    }
}
