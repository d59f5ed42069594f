//! API layer
//!
//! HTTP handlers for:
//! - Dashboard (protected)
//! - Metrics (Prometheus)

mod dashboard;
pub mod metrics;

pub use dashboard::dashboard_router;
pub use metrics::metrics_router;
