//! Routing-stage middleware.
//!
//! # Data Flow
//! ```text
//! global_hooks.rs (outermost, optional)
//!     → axum router
//!         → matched: per-route dispatcher
//!         → unmatched: method_not_allowed.rs → not_found
//! ```

pub mod global_hooks;
pub mod method_not_allowed;

pub use global_hooks::{global_hooks_middleware, GlobalHookState, Options};
pub use method_not_allowed::{method_not_allowed_middleware, not_found};
