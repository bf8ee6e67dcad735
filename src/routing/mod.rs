//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     ModuleFactory[]
//!     → table.rs (one entry per (method, path), duplicates rejected)
//!     → known_paths.rs (trimmed, lowercased, verb-agnostic)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request:
//!     → axum router matches (method, path) → dispatcher
//!     → no match → method-not-allowed guard consults KnownPaths
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Path-pattern matching is left to the axum router
//! - The known-path set only answers "is this path owned?"

pub mod key;
pub mod known_paths;
pub mod table;

pub use key::{normalize_path, RouteKey};
pub use known_paths::KnownPaths;
pub use table::{RouteEntry, RouteTable};
