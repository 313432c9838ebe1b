//! Structured logging utilities
//!
//! Event-style log lines for recurrence processing. Field names are stable so
//! JSON logs can be queried by `event`.

use chrono::{DateTime, Utc};
use recurrence_config::OutputFormat;
use recurrence_domain::{SkipReason, TemplateFlavor};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Structured logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: OutputFormat,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Pretty,
            include_location: false,
        }
    }
}

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    /// Log a spawned instance
    pub fn log_instance_spawned(
        template_id: Uuid,
        flavor: TemplateFlavor,
        instance_id: Uuid,
        occurrence_date: DateTime<Utc>,
    ) {
        info!(
            event = "instance_spawned",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            instance.id = %instance_id,
            instance.occurrence_date = %occurrence_date,
            "Recurring instance created"
        );
    }

    /// Log an occurrence skipped because an instance already exists
    pub fn log_instance_deduplicated(
        template_id: Uuid,
        flavor: TemplateFlavor,
        occurrence_date: DateTime<Utc>,
    ) {
        info!(
            event = "instance_deduplicated",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            instance.occurrence_date = %occurrence_date,
            "Instance already exists for occurrence, creation skipped"
        );
    }

    /// Log a template advanced to its next occurrence
    pub fn log_template_advanced(
        template_id: Uuid,
        flavor: TemplateFlavor,
        next_occurrence_date: Option<DateTime<Utc>>,
    ) {
        debug!(
            event = "template_advanced",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            template.next_occurrence_date = ?next_occurrence_date,
            "Template pointer advanced"
        );
    }

    /// Log a template whose series has ended
    pub fn log_template_closed_out(template_id: Uuid, flavor: TemplateFlavor) {
        info!(
            event = "template_closed_out",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            "Recurrence series passed its end date, template paused"
        );
    }

    /// Log a skipped template
    pub fn log_template_skipped(template_id: Uuid, flavor: TemplateFlavor, reason: SkipReason) {
        debug!(
            event = "template_skipped",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            skip.reason = reason.as_str(),
            "Template skipped"
        );
    }

    /// Log a per-template failure; processing continues with the next template
    pub fn log_template_failed(
        template_id: Uuid,
        flavor: TemplateFlavor,
        description: &str,
        error: &dyn std::error::Error,
    ) {
        error!(
            event = "template_failed",
            template.id = %template_id,
            template.flavor = flavor.as_str(),
            template.description = description,
            error = %error,
            "Failed to process recurring template"
        );
    }

    /// Log a reminder notification attempt
    pub fn log_notification(template_id: Uuid, recipient: &str, success: bool, error: Option<&str>) {
        if success {
            info!(
                event = "notification_delivered",
                template.id = %template_id,
                notification.to = recipient,
                "Reminder notification delivered"
            );
        } else {
            warn!(
                event = "notification_failed",
                template.id = %template_id,
                notification.to = recipient,
                error = error.unwrap_or("Unknown error"),
                "Reminder notification failed"
            );
        }
    }

    /// Log the aggregate result of one processing run
    #[allow(clippy::too_many_arguments)]
    pub fn log_processing_run_complete(
        flavor: TemplateFlavor,
        processed: usize,
        created: usize,
        updated: usize,
        skipped: usize,
        closed_out: usize,
        errored: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "processing_run_complete",
            run.flavor = flavor.as_str(),
            run.processed = processed,
            run.created = created,
            run.updated = updated,
            run.skipped = skipped,
            run.closed_out = closed_out,
            run.errored = errored,
            run.duration_ms = duration_ms,
            "Recurring processing run completed"
        );
    }
}
