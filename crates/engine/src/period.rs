use chrono::{DateTime, Duration, Months, Utc};
use tracing::warn;

use recurrence_domain::RecurrencePattern;

/// 按周期模式推进一个周期
///
/// `interval` 只作用于 daily/weekly/monthly/yearly，0 按 1 处理；
/// biweekly 和 quarterly 固定步长。无法识别的模式按 monthly 处理。
/// 月份运算沿用 chrono 的月末截断（1月31日 + 1个月 = 2月最后一天）。
/// 超出可表示的日期范围时返回 `None`。
pub fn advance(
    date: DateTime<Utc>,
    pattern: &RecurrencePattern,
    interval: u32,
) -> Option<DateTime<Utc>> {
    let interval = interval.max(1);
    match pattern {
        RecurrencePattern::Daily => date.checked_add_signed(Duration::days(i64::from(interval))),
        RecurrencePattern::Weekly => {
            date.checked_add_signed(Duration::days(7 * i64::from(interval)))
        }
        RecurrencePattern::Biweekly => date.checked_add_signed(Duration::days(14)),
        RecurrencePattern::Monthly => date.checked_add_months(Months::new(interval)),
        RecurrencePattern::Quarterly => date.checked_add_months(Months::new(3)),
        RecurrencePattern::Yearly => interval
            .checked_mul(12)
            .and_then(|months| date.checked_add_months(Months::new(months))),
        RecurrencePattern::Other(raw) => {
            warn!("无法识别的周期模式 '{raw}'，按月推进");
            date.checked_add_months(Months::new(interval))
        }
    }
}
