use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, warn};

use recurrence_domain::{Decision, RecurrenceTemplate, SkipReason, TemplatePatch};
use recurrence_errors::{RecurrenceError, RecurrenceResult};

use crate::period::advance;
use crate::projection::project_instance;

/// 周期评估引擎
///
/// 无状态、同步；日期比较统一换算到同一时区的自然日（默认UTC）。
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceEngine {
    offset: FixedOffset,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurrenceEngine {
    pub fn new() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// 使用固定的UTC偏移（分钟）作为自然日的换算时区
    pub fn with_utc_offset_minutes(minutes: i32) -> RecurrenceResult<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| RecurrenceError::config_error(format!("无效的UTC偏移: {minutes}分钟")))?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 时间戳所在的自然日（午夜归一化）
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// 计算下一次发生时使用的倍数：只有任务模板使用 `recurrence_interval`
    pub fn step_interval(template: &RecurrenceTemplate) -> u32 {
        if template.flavor().honors_interval() {
            template.effective_interval()
        } else {
            1
        }
    }

    /// 评估模板在 `now` 时刻是否到期
    ///
    /// 同一 (template, now) 总是得到相同的结果。
    pub fn evaluate(&self, template: &RecurrenceTemplate, now: DateTime<Utc>) -> Decision {
        if template.is_paused {
            debug!("模板 {} 已暂停，跳过", template.id);
            return Decision::Skip {
                reason: SkipReason::Paused,
            };
        }

        let today = self.day_of(now);

        if let Some(end) = template.recurrence_end_date {
            if self.day_of(end) < today {
                debug!("模板 {} 已过结束日期 {}，跳过", template.id, end);
                return Decision::Skip {
                    reason: SkipReason::Expired,
                };
            }
        }

        let Some(due) = template.next_occurrence_date else {
            return Decision::Skip {
                reason: SkipReason::NotYetDue,
            };
        };

        if self.day_of(due) > today {
            return Decision::Skip {
                reason: SkipReason::NotYetDue,
            };
        }

        let instance = project_instance(template, due);
        let next = advance(
            due,
            &template.recurrence_pattern,
            Self::step_interval(template),
        );

        let Some(next) = next else {
            warn!(
                "模板 {} 的下一次发生时间超出日期范围，结束该序列",
                template.id
            );
            return Decision::CloseOut {
                instance,
                template_update: TemplatePatch::close_out(),
            };
        };

        if let Some(end) = template.recurrence_end_date {
            if self.day_of(next) > self.day_of(end) {
                debug!(
                    "模板 {} 下一次发生时间 {} 超出结束日期 {}，结束该序列",
                    template.id, next, end
                );
                return Decision::CloseOut {
                    instance,
                    template_update: TemplatePatch::close_out(),
                };
            }
        }

        debug!(
            "模板 {} 到期: 本次={}, 下一次={}",
            template.id,
            due.format("%Y-%m-%d %H:%M:%S UTC"),
            next.format("%Y-%m-%d %H:%M:%S UTC")
        );
        Decision::Spawn {
            instance,
            template_update: TemplatePatch::advance_to(next),
        }
    }
}
