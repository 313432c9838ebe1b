use async_trait::async_trait;
use recurrence_errors::RecurrenceResult;
use serde::{Deserialize, Serialize};

use crate::entities::ReminderInstanceDetails;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn for_reminder(details: &ReminderInstanceDetails) -> Self {
        Self {
            recipient: details.recipient.clone(),
            subject: details.title.clone(),
            body: details.message.clone(),
        }
    }
}

/// Interface for outbound notifications (e-mail or message delivery)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> RecurrenceResult<()>;
}
