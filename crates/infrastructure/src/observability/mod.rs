//! Observability module
//!
//! - Metrics collection (`metrics` facade, optional Prometheus exporter)
//! - Structured logging of recurrence processing events
//! - Logging/metrics initialisation

pub mod metrics_collector;
pub mod structured_logger;
pub mod telemetry_setup;

pub use metrics_collector::MetricsCollector;
pub use structured_logger::{LoggingConfig, StructuredLogger};
pub use telemetry_setup::{init_metrics, init_structured_logging};
