use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecurrenceError {
    #[error("周期模板未找到: {id}")]
    TemplateNotFound { id: Uuid },
    #[error("无效的周期模板: {0}")]
    InvalidTemplate(String),
    #[error("存储操作错误: {0}")]
    Storage(String),
    #[error("通知发送失败: {0}")]
    Notification(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("IO错误: {0}")]
    Io(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type RecurrenceResult<T> = Result<T, RecurrenceError>;

impl RecurrenceError {
    pub fn template_not_found(id: Uuid) -> Self {
        Self::TemplateNotFound { id }
    }
    pub fn invalid_template<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTemplate(msg.into())
    }
    pub fn storage_error<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
    pub fn notification_error<S: Into<String>>(msg: S) -> Self {
        Self::Notification(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecurrenceError::Internal(_) | RecurrenceError::Configuration(_)
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RecurrenceError::Storage(_) | RecurrenceError::Notification(_) | RecurrenceError::Io(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            RecurrenceError::TemplateNotFound { .. } => "请求的周期模板不存在",
            RecurrenceError::InvalidTemplate(_) => "周期模板配置有误",
            RecurrenceError::Notification(_) => "提醒发送失败，将在下次运行时记录",
            RecurrenceError::Configuration(_) => "系统配置有误，请联系管理员",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for RecurrenceError {
    fn from(err: serde_json::Error) -> Self {
        RecurrenceError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RecurrenceError {
    fn from(err: std::io::Error) -> Self {
        RecurrenceError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for RecurrenceError {
    fn from(err: anyhow::Error) -> Self {
        RecurrenceError::Internal(err.to_string())
    }
}
