//! 周期滚动计算引擎
//!
//! 纯函数：给定模板和当前时间，决定是否生成实例以及下一次发生时间。
//! 所有存储写入由调用方根据 [`Decision`](recurrence_domain::Decision) 完成。

pub mod evaluator;
pub mod period;
pub mod projection;

pub use evaluator::RecurrenceEngine;
pub use period::advance;
pub use projection::{
    project_instance, InstanceProjection, ReminderProjection, TaskProjection,
    TransactionProjection,
};
