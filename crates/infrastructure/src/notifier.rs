use async_trait::async_trait;
use recurrence_domain::{Notification, Notifier};
use recurrence_errors::{RecurrenceError, RecurrenceResult};
use tracing::info;

/// 把通知写入日志的通知器
///
/// 嵌入式部署下代替邮件投递；`enabled = false` 时拒绝发送，便于演练失败路径。
#[derive(Debug, Clone)]
pub struct LogNotifier {
    sender: String,
    enabled: bool,
}

impl LogNotifier {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            enabled: true,
        }
    }

    pub fn disabled(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            enabled: false,
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> RecurrenceResult<()> {
        if !self.enabled {
            return Err(RecurrenceError::notification_error("通知通道已禁用"));
        }
        if notification.recipient.trim().is_empty() {
            return Err(RecurrenceError::notification_error("收件人为空"));
        }
        info!(
            event = "notification_sent",
            notification.from = %self.sender,
            notification.to = %notification.recipient,
            notification.subject = %notification.subject,
            "{}",
            notification.body
        );
        Ok(())
    }
}
