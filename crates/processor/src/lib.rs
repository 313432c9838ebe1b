//! 周期处理器
//!
//! 列出某一类别的周期模板，逐个交给引擎判定，并把判定结果落到存储：
//! 先写实例，再推进模板指针。单个模板失败只记录，不中断整批。

pub mod processor;
pub mod summary;

pub use processor::RecurringProcessor;
pub use summary::{ProcessingError, ProcessingStage, ProcessingSummary, SkipCounts, TemplateOutcome};
