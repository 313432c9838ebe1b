//! 周期引擎的评估结果

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{RecurrenceInstance, RecurrenceTemplate};
use crate::update_value::UpdateValue;

/// 模板的局部更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplatePatch {
    #[serde(default, skip_serializing_if = "UpdateValue::is_no_change")]
    pub next_occurrence_date: UpdateValue<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "UpdateValue::is_no_change")]
    pub is_paused: UpdateValue<bool>,
}

impl TemplatePatch {
    /// 把下一次发生时间推进到 `next`
    pub fn advance_to(next: DateTime<Utc>) -> Self {
        Self {
            next_occurrence_date: UpdateValue::Set(next),
            is_paused: UpdateValue::NoChange,
        }
    }

    /// 结束序列：暂停模板并清空下一次发生时间
    pub fn close_out() -> Self {
        Self {
            next_occurrence_date: UpdateValue::Unset,
            is_paused: UpdateValue::Set(true),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.next_occurrence_date.is_no_change() && self.is_paused.is_no_change()
    }

    /// 合并到模板上，不修改 `updated_at`（由存储层维护）
    pub fn apply_to(&self, template: &mut RecurrenceTemplate) {
        template.next_occurrence_date = self
            .next_occurrence_date
            .clone()
            .apply_to(template.next_occurrence_date);
        match self.is_paused {
            UpdateValue::Set(paused) => template.is_paused = paused,
            UpdateValue::Unset => template.is_paused = false,
            UpdateValue::NoChange => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Paused,
    Expired,
    NotYetDue,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Paused => "paused",
            SkipReason::Expired => "expired",
            SkipReason::NotYetDue => "not_yet_due",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 对单个模板的一次评估结果
///
/// `CloseOut` 同样携带本次到期的实例：当前发生照常生成，只是下一次已超出结束日期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Skip {
        reason: SkipReason,
    },
    Spawn {
        instance: RecurrenceInstance,
        template_update: TemplatePatch,
    },
    CloseOut {
        instance: RecurrenceInstance,
        template_update: TemplatePatch,
    },
}

impl Decision {
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Decision::Skip { reason } => Some(*reason),
            _ => None,
        }
    }

    pub fn instance(&self) -> Option<&RecurrenceInstance> {
        match self {
            Decision::Spawn { instance, .. } | Decision::CloseOut { instance, .. } => {
                Some(instance)
            }
            Decision::Skip { .. } => None,
        }
    }

    pub fn template_update(&self) -> Option<&TemplatePatch> {
        match self {
            Decision::Spawn {
                template_update, ..
            }
            | Decision::CloseOut {
                template_update, ..
            } => Some(template_update),
            Decision::Skip { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Skip { .. } => "skip",
            Decision::Spawn { .. } => "spawn",
            Decision::CloseOut { .. } => "close_out",
        }
    }
}
