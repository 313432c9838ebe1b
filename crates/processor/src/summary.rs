use std::time::Duration;

use chrono::{DateTime, Utc};
use recurrence_domain::{SkipReason, TemplateFlavor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 单个模板处理失败所在的步骤
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    DuplicateCheck,
    Notify,
    CreateInstance,
    UpdateTemplate,
}

impl ProcessingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStage::DuplicateCheck => "duplicate_check",
            ProcessingStage::Notify => "notify",
            ProcessingStage::CreateInstance => "create_instance",
            ProcessingStage::UpdateTemplate => "update_template",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingError {
    pub template_id: Uuid,
    pub description: String,
    pub stage: ProcessingStage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkipCounts {
    pub paused: usize,
    pub expired: usize,
    pub not_yet_due: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.paused + self.expired + self.not_yet_due
    }

    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Paused => self.paused += 1,
            SkipReason::Expired => self.expired += 1,
            SkipReason::NotYetDue => self.not_yet_due += 1,
        }
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::Paused => self.paused,
            SkipReason::Expired => self.expired,
            SkipReason::NotYetDue => self.not_yet_due,
        }
    }
}

/// 单个模板的处理结果，由处理器汇总进 [`ProcessingSummary`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateOutcome {
    pub skipped: Option<SkipReason>,
    pub instance_created: bool,
    pub deduplicated: bool,
    pub template_updated: bool,
    pub closed_out: bool,
    /// `None` 表示没有尝试发送通知
    pub notification_delivered: Option<bool>,
    pub errors: Vec<ProcessingError>,
}

impl TemplateOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// 存储失败才算模板出错；通知失败单独统计
    pub fn is_failed(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.stage != ProcessingStage::Notify)
    }
}

/// 一次处理运行的汇总
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingSummary {
    pub flavor: TemplateFlavor,
    pub evaluated_at: DateTime<Utc>,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub skipped_by_reason: SkipCounts,
    pub closed_out: usize,
    pub deduplicated: usize,
    pub notified: usize,
    pub notification_failures: usize,
    pub errored: usize,
    pub errors: Vec<ProcessingError>,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
}

impl ProcessingSummary {
    pub fn new(flavor: TemplateFlavor, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            flavor,
            evaluated_at,
            processed: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            skipped_by_reason: SkipCounts::default(),
            closed_out: 0,
            deduplicated: 0,
            notified: 0,
            notification_failures: 0,
            errored: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn record(&mut self, outcome: TemplateOutcome) {
        self.processed += 1;

        if let Some(reason) = outcome.skipped {
            self.skipped += 1;
            self.skipped_by_reason.record(reason);
            return;
        }

        if outcome.instance_created {
            self.created += 1;
        }
        if outcome.deduplicated {
            self.deduplicated += 1;
        }
        if outcome.template_updated {
            self.updated += 1;
        }
        if outcome.closed_out {
            self.closed_out += 1;
        }
        match outcome.notification_delivered {
            Some(true) => self.notified += 1,
            Some(false) => self.notification_failures += 1,
            None => {}
        }
        if outcome.is_failed() {
            self.errored += 1;
        }
        self.errors.extend(outcome.errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
