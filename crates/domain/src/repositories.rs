//! 领域仓储抽象
//!
//! 实体存储对外部平台的抽象：按条件列出、创建（分配ID与创建时间）、局部更新。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recurrence_errors::RecurrenceResult;
use uuid::Uuid;

use crate::decision::TemplatePatch;
use crate::entities::{RecurrenceInstance, RecurrenceTemplate, TemplateFilter};

/// 周期模板仓储抽象
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: &RecurrenceTemplate) -> RecurrenceResult<RecurrenceTemplate>;
    async fn get_by_id(&self, id: Uuid) -> RecurrenceResult<Option<RecurrenceTemplate>>;
    async fn list(&self, filter: &TemplateFilter) -> RecurrenceResult<Vec<RecurrenceTemplate>>;
    /// 局部合并更新，模板不存在时返回 `TemplateNotFound`
    async fn update(&self, id: Uuid, patch: &TemplatePatch) -> RecurrenceResult<RecurrenceTemplate>;
}

/// 周期实例仓储抽象
#[async_trait]
pub trait InstanceRepository: Send + Sync {
    async fn create(&self, instance: &RecurrenceInstance) -> RecurrenceResult<RecurrenceInstance>;
    async fn list_by_parent(&self, parent_template_id: Uuid)
        -> RecurrenceResult<Vec<RecurrenceInstance>>;
    /// 是否已存在同一模板同一发生时间的实例，用于去重
    async fn exists_for_occurrence(
        &self,
        parent_template_id: Uuid,
        occurrence_date: DateTime<Utc>,
    ) -> RecurrenceResult<bool>;
}
