//! HTTP host integration.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, trace/timeout/request-id layers)
//!     → middleware/ (global hooks, 405 guard)
//!     → context.rs (per-request HttpContext)
//!     → response.rs (status, headers, body sink → axum Response)
//! ```

pub mod context;
pub mod middleware;
pub mod negotiate;
pub mod request;
pub mod response;
pub mod server;

pub use context::HttpContext;
pub use negotiate::{JsonNegotiator, Negotiators, ResponseNegotiator};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ResponseState;
pub use server::HttpServer;
