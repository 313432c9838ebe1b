use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 周期模式
///
/// 无法识别的模式字符串保留在 `Other` 中，推进时按月处理。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
    Other(String),
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Biweekly => "biweekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Quarterly => "quarterly",
            RecurrencePattern::Yearly => "yearly",
            RecurrencePattern::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, RecurrencePattern::Other(_))
    }
}

impl From<&str> for RecurrencePattern {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "daily" => RecurrencePattern::Daily,
            "weekly" => RecurrencePattern::Weekly,
            "biweekly" => RecurrencePattern::Biweekly,
            "monthly" => RecurrencePattern::Monthly,
            "quarterly" => RecurrencePattern::Quarterly,
            "yearly" => RecurrencePattern::Yearly,
            _ => RecurrencePattern::Other(value.to_string()),
        }
    }
}

impl From<String> for RecurrencePattern {
    fn from(value: String) -> Self {
        RecurrencePattern::from(value.as_str())
    }
}

impl From<RecurrencePattern> for String {
    fn from(pattern: RecurrencePattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 模板类别：任务、交易、提醒共用同一套周期逻辑
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFlavor {
    Task,
    Transaction,
    Reminder,
}

impl TemplateFlavor {
    pub fn all() -> [TemplateFlavor; 3] {
        [
            TemplateFlavor::Task,
            TemplateFlavor::Transaction,
            TemplateFlavor::Reminder,
        ]
    }

    /// 只有任务模板使用 `recurrence_interval` 倍数，交易和提醒固定按一个周期推进
    pub fn honors_interval(&self) -> bool {
        matches!(self, TemplateFlavor::Task)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFlavor::Task => "task",
            TemplateFlavor::Transaction => "transaction",
            TemplateFlavor::Reminder => "reminder",
        }
    }
}

impl fmt::Display for TemplateFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(TemplateFlavor::Task),
            "transaction" => Ok(TemplateFlavor::Transaction),
            "reminder" => Ok(TemplateFlavor::Reminder),
            _ => Err(format!(
                "Invalid template flavor: {s}. Valid flavors: task, transaction, reminder"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDetails {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDetails {
    pub amount: f64,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderDetails {
    pub title: String,
    pub message: String,
    pub recipient: String,
}

/// 模板的业务字段，按类别区分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum TemplateDetails {
    Task(TaskDetails),
    Transaction(TransactionDetails),
    Reminder(ReminderDetails),
}

impl TemplateDetails {
    pub fn flavor(&self) -> TemplateFlavor {
        match self {
            TemplateDetails::Task(_) => TemplateFlavor::Task,
            TemplateDetails::Transaction(_) => TemplateFlavor::Transaction,
            TemplateDetails::Reminder(_) => TemplateFlavor::Reminder,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            TemplateDetails::Task(task) => &task.title,
            TemplateDetails::Transaction(tx) => &tx.description,
            TemplateDetails::Reminder(reminder) => &reminder.title,
        }
    }
}

fn default_interval() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// 周期模板
///
/// 任务、交易、提醒三种模板共享的结构。`next_occurrence_date` 兼容
/// `due_date` 与 `reminder_time` 两种历史字段名。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceTemplate {
    #[serde(default)]
    pub id: Uuid,
    pub recurrence_pattern: RecurrencePattern,
    #[serde(default = "default_interval")]
    pub recurrence_interval: u32,
    #[serde(default, alias = "due_date", alias = "reminder_time")]
    pub next_occurrence_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurrence_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default = "default_true", alias = "is_template")]
    pub is_recurring: bool,
    pub created_by: String,
    pub details: TemplateDetails,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RecurrenceTemplate {
    pub fn new(
        created_by: String,
        recurrence_pattern: RecurrencePattern,
        first_occurrence: DateTime<Utc>,
        details: TemplateDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(), // 将由存储层生成
            recurrence_pattern,
            recurrence_interval: 1,
            next_occurrence_date: Some(first_occurrence),
            recurrence_end_date: None,
            is_paused: false,
            is_recurring: true,
            created_by,
            details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn flavor(&self) -> TemplateFlavor {
        self.details.flavor()
    }

    /// 实际生效的周期倍数，0 按 1 处理
    pub fn effective_interval(&self) -> u32 {
        self.recurrence_interval.max(1)
    }

    pub fn entity_description(&self) -> String {
        format!(
            "{}模板 '{}' (ID: {}, 周期: {})",
            self.flavor(),
            self.details.summary(),
            self.id,
            self.recurrence_pattern
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskInstanceDetails {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionInstanceDetails {
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub description: String,
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderInstanceDetails {
    pub title: String,
    pub message: String,
    pub recipient: String,
    /// 提醒是否已成功投递
    #[serde(default)]
    pub delivered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum InstanceDetails {
    Task(TaskInstanceDetails),
    Transaction(TransactionInstanceDetails),
    Reminder(ReminderInstanceDetails),
}

impl InstanceDetails {
    pub fn flavor(&self) -> TemplateFlavor {
        match self {
            InstanceDetails::Task(_) => TemplateFlavor::Task,
            InstanceDetails::Transaction(_) => TemplateFlavor::Transaction,
            InstanceDetails::Reminder(_) => TemplateFlavor::Reminder,
        }
    }
}

/// 由模板为某一次发生生成的具体记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceInstance {
    #[serde(default)]
    pub id: Uuid,
    pub parent_template_id: Uuid,
    pub created_by: String,
    /// 模板的到期时间，保持原始精度
    pub occurrence_date: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    pub details: InstanceDetails,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RecurrenceInstance {
    pub fn flavor(&self) -> TemplateFlavor {
        self.details.flavor()
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_nil()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub flavor: Option<TemplateFlavor>,
    pub include_paused: bool,
    pub recurring_only: bool,
}

impl TemplateFilter {
    /// 处理一次运行所需的过滤条件：该类别的全部周期模板，包含已暂停的
    pub fn recurring(flavor: TemplateFlavor) -> Self {
        Self {
            flavor: Some(flavor),
            include_paused: true,
            recurring_only: true,
        }
    }

    pub fn matches(&self, template: &RecurrenceTemplate) -> bool {
        if let Some(flavor) = self.flavor {
            if template.flavor() != flavor {
                return false;
            }
        }
        if !self.include_paused && template.is_paused {
            return false;
        }
        if self.recurring_only && !template.is_recurring {
            return false;
        }
        true
    }
}
