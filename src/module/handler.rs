//! Handler and hook signatures.
//!
//! Handlers and hooks borrow the request context mutably for the duration of
//! the returned future. State they need must be cloned into the future.

use axum::BoxError;
use futures_util::future::BoxFuture;

use crate::http::HttpContext;

/// Future returned by handlers and hooks.
pub type HookFuture<'a, T> = BoxFuture<'a, Result<T, BoxError>>;

/// A route handler.
pub type HandlerFn = dyn for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync;

/// A Before hook. `Ok(false)` stops the rest of its scope without failing the request.
pub type BeforeFn = dyn for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, bool> + Send + Sync;

/// An After hook.
pub type AfterFn = dyn for<'a> Fn(&'a mut HttpContext) -> HookFuture<'a, ()> + Send + Sync;
