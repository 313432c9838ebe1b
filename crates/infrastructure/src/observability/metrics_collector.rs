//! Metrics collector for recurrence processing
//!
//! Thin wrapper over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use metrics::{counter, histogram};
use recurrence_domain::{SkipReason, TemplateFlavor};

#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    /// Record one template evaluation and its decision kind
    pub fn record_evaluation(&self, flavor: TemplateFlavor, decision: &'static str) {
        counter!(
            "recurrence_templates_evaluated_total",
            "flavor" => flavor.as_str(),
            "decision" => decision
        )
        .increment(1);
    }

    pub fn record_skip(&self, flavor: TemplateFlavor, reason: SkipReason) {
        counter!(
            "recurrence_templates_skipped_total",
            "flavor" => flavor.as_str(),
            "reason" => reason.as_str()
        )
        .increment(1);
    }

    pub fn record_instance_created(&self, flavor: TemplateFlavor) {
        counter!("recurrence_instances_created_total", "flavor" => flavor.as_str()).increment(1);
    }

    pub fn record_instance_deduplicated(&self, flavor: TemplateFlavor) {
        counter!("recurrence_instances_deduplicated_total", "flavor" => flavor.as_str())
            .increment(1);
    }

    pub fn record_close_out(&self, flavor: TemplateFlavor) {
        counter!("recurrence_templates_closed_out_total", "flavor" => flavor.as_str())
            .increment(1);
    }

    pub fn record_processing_error(&self, flavor: TemplateFlavor) {
        counter!("recurrence_processing_errors_total", "flavor" => flavor.as_str()).increment(1);
    }

    pub fn record_notification(&self, success: bool) {
        let status = if success { "delivered" } else { "failed" };
        counter!("recurrence_notifications_total", "status" => status).increment(1);
    }

    pub fn record_run_duration(&self, flavor: TemplateFlavor, duration_seconds: f64) {
        histogram!(
            "recurrence_processing_run_duration_seconds",
            "flavor" => flavor.as_str()
        )
        .record(duration_seconds);
    }
}
