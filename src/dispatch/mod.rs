//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! matched route
//!     → dispatcher.rs (module hooks, handler, HEAD handling)
//!     → status.rs (first status-code handler accepting the final status)
//!     → HttpContext converted into the host response
//! ```

pub mod dispatcher;
pub mod status;

pub use dispatcher::RouteDispatcher;
pub use status::{StatusCodeHandler, StatusCodeHandlers};
