//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / middleware produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span (tower-http request-id + trace layers)
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
