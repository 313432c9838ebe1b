//! Test data builders for creating recurrence templates
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use chrono::Utc;
use recurrence_domain::{
    RecurrencePattern, RecurrenceTemplate, ReminderDetails, TaskDetails, TaskPriority,
    TemplateDetails, TransactionDetails, TransactionType,
};
use uuid::Uuid;

use crate::helpers::ts;

/// Builder for creating test RecurrenceTemplate entities
pub struct TemplateBuilder {
    template: RecurrenceTemplate,
}

impl TemplateBuilder {
    fn with_details(details: TemplateDetails) -> Self {
        let now = Utc::now();
        Self {
            template: RecurrenceTemplate {
                id: Uuid::new_v4(),
                recurrence_pattern: RecurrencePattern::Daily,
                recurrence_interval: 1,
                next_occurrence_date: Some(ts("2024-03-10")),
                recurrence_end_date: None,
                is_paused: false,
                is_recurring: true,
                created_by: "owner@example.com".to_string(),
                details,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn task(title: &str) -> Self {
        Self::with_details(TemplateDetails::Task(TaskDetails {
            title: title.to_string(),
            description: Some(format!("{title} description")),
            priority: TaskPriority::Medium,
            assigned_to: None,
            estimated_minutes: Some(30),
        }))
    }

    pub fn transaction(description: &str, amount: f64) -> Self {
        Self::with_details(TemplateDetails::Transaction(TransactionDetails {
            amount,
            transaction_type: TransactionType::Expense,
            category: Some("operations".to_string()),
            description: description.to_string(),
            account: None,
        }))
    }

    pub fn reminder(title: &str, recipient: &str) -> Self {
        Self::with_details(TemplateDetails::Reminder(ReminderDetails {
            title: title.to_string(),
            message: format!("Reminder: {title}"),
            recipient: recipient.to_string(),
        }))
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.template.id = id;
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.template.recurrence_pattern = RecurrencePattern::from(pattern);
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.template.recurrence_interval = interval;
        self
    }

    pub fn due(mut self, due: &str) -> Self {
        self.template.next_occurrence_date = Some(ts(due));
        self
    }

    pub fn without_due_date(mut self) -> Self {
        self.template.next_occurrence_date = None;
        self
    }

    pub fn ends(mut self, end: &str) -> Self {
        self.template.recurrence_end_date = Some(ts(end));
        self
    }

    pub fn paused(mut self) -> Self {
        self.template.is_paused = true;
        self
    }

    pub fn not_recurring(mut self) -> Self {
        self.template.is_recurring = false;
        self
    }

    pub fn build(self) -> RecurrenceTemplate {
        self.template
    }
}
