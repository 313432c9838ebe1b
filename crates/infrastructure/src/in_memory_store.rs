use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recurrence_domain::{
    InstanceRepository, RecurrenceInstance, RecurrenceTemplate, TemplateFilter, TemplatePatch,
    TemplateRepository,
};
use recurrence_errors::{RecurrenceError, RecurrenceResult};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// 存储快照，作为种子文件和持久化文件的格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub templates: Vec<RecurrenceTemplate>,
    #[serde(default)]
    pub instances: Vec<RecurrenceInstance>,
}

/// 内存实体存储
///
/// 实现模板与实例两个仓储接口，用于嵌入式部署和测试。
/// 创建时分配ID与创建时间，更新为局部合并。
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    templates: Arc<RwLock<HashMap<Uuid, RecurrenceTemplate>>>,
    instances: Arc<RwLock<Vec<RecurrenceInstance>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从快照构建存储，缺少ID的记录在此分配
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let now = Utc::now();
        let templates = snapshot
            .templates
            .into_iter()
            .map(|mut template| {
                if template.id.is_nil() {
                    template.id = Uuid::new_v4();
                }
                (template.id, template)
            })
            .collect();
        let instances = snapshot
            .instances
            .into_iter()
            .map(|mut instance| {
                if instance.id.is_nil() {
                    instance.id = Uuid::new_v4();
                }
                instance.created_at.get_or_insert(now);
                instance
            })
            .collect();

        Self {
            templates: Arc::new(RwLock::new(templates)),
            instances: Arc::new(RwLock::new(instances)),
        }
    }

    pub async fn load_from_file(path: impl AsRef<Path>) -> RecurrenceResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RecurrenceError::Io(format!("读取存储文件失败 {}: {e}", path.display()))
        })?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        let store = Self::from_snapshot(snapshot);
        info!(
            "从 {} 加载了 {} 个模板, {} 个实例",
            path.display(),
            store.templates.read().await.len(),
            store.instances.read().await.len()
        );
        Ok(store)
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let mut templates: Vec<RecurrenceTemplate> =
            self.templates.read().await.values().cloned().collect();
        templates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        StoreSnapshot {
            templates,
            instances: self.instances.read().await.clone(),
        }
    }

    /// 写入临时文件后再替换，避免中途失败留下半个文件
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> RecurrenceResult<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot().await;
        let content = serde_json::to_string_pretty(&snapshot)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        debug!("存储快照已写入 {}", path.display());
        Ok(())
    }

    pub async fn template_count(&self) -> usize {
        self.templates.read().await.len()
    }

    pub async fn instance_count(&self) -> usize {
        self.instances.read().await.len()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryEntityStore {
    async fn create(&self, template: &RecurrenceTemplate) -> RecurrenceResult<RecurrenceTemplate> {
        let now = Utc::now();
        let mut created = template.clone();
        created.id = Uuid::new_v4();
        created.created_at = now;
        created.updated_at = now;

        self.templates
            .write()
            .await
            .insert(created.id, created.clone());
        debug!("创建模板: {}", created.entity_description());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> RecurrenceResult<Option<RecurrenceTemplate>> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &TemplateFilter) -> RecurrenceResult<Vec<RecurrenceTemplate>> {
        let templates = self.templates.read().await;
        let mut matching: Vec<RecurrenceTemplate> = templates
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn update(&self, id: Uuid, patch: &TemplatePatch) -> RecurrenceResult<RecurrenceTemplate> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(&id)
            .ok_or_else(|| RecurrenceError::template_not_found(id))?;
        patch.apply_to(template);
        template.updated_at = Utc::now();
        Ok(template.clone())
    }
}

#[async_trait]
impl InstanceRepository for InMemoryEntityStore {
    async fn create(&self, instance: &RecurrenceInstance) -> RecurrenceResult<RecurrenceInstance> {
        let mut created = instance.clone();
        created.id = Uuid::new_v4();
        created.created_at = Some(Utc::now());

        self.instances.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_by_parent(
        &self,
        parent_template_id: Uuid,
    ) -> RecurrenceResult<Vec<RecurrenceInstance>> {
        Ok(self
            .instances
            .read()
            .await
            .iter()
            .filter(|i| i.parent_template_id == parent_template_id)
            .cloned()
            .collect())
    }

    async fn exists_for_occurrence(
        &self,
        parent_template_id: Uuid,
        occurrence_date: DateTime<Utc>,
    ) -> RecurrenceResult<bool> {
        Ok(self.instances.read().await.iter().any(|i| {
            i.parent_template_id == parent_template_id && i.occurrence_date == occurrence_date
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurrence_domain::TemplateFlavor;
    use recurrence_testing_utils::{ts, TemplateBuilder};

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = InMemoryEntityStore::new();
        let template = TemplateBuilder::task("周报")
            .with_id(Uuid::nil())
            .build();

        let created = TemplateRepository::create(&store, &template).await.unwrap();
        assert!(!created.id.is_nil());
        assert_eq!(store.template_count().await, 1);

        let fetched = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.details, template.details);
    }

    #[tokio::test]
    async fn test_list_filters_by_flavor_and_pause() {
        let store = InMemoryEntityStore::from_snapshot(StoreSnapshot {
            templates: vec![
                TemplateBuilder::task("a").build(),
                TemplateBuilder::task("b").paused().build(),
                TemplateBuilder::transaction("c", 10.0).build(),
                TemplateBuilder::task("d").not_recurring().build(),
            ],
            instances: vec![],
        });

        let recurring_tasks = store
            .list(&TemplateFilter::recurring(TemplateFlavor::Task))
            .await
            .unwrap();
        assert_eq!(recurring_tasks.len(), 2);

        let active_tasks = store
            .list(&TemplateFilter {
                flavor: Some(TemplateFlavor::Task),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active_tasks.len(), 2);
        assert!(active_tasks.iter().all(|t| !t.is_paused));
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let template = TemplateBuilder::reminder("缴费", "a@example.com").build();
        let id = template.id;
        let store = InMemoryEntityStore::from_snapshot(StoreSnapshot {
            templates: vec![template],
            instances: vec![],
        });

        let updated = store
            .update(id, &TemplatePatch::advance_to(ts("2024-03-17")))
            .await
            .unwrap();
        assert_eq!(updated.next_occurrence_date, Some(ts("2024-03-17")));
        assert!(!updated.is_paused);

        let updated = store.update(id, &TemplatePatch::close_out()).await.unwrap();
        assert!(updated.is_paused);
        assert_eq!(updated.next_occurrence_date, None);

        let missing = store
            .update(Uuid::new_v4(), &TemplatePatch::close_out())
            .await;
        assert!(matches!(
            missing,
            Err(RecurrenceError::TemplateNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = InMemoryEntityStore::from_snapshot(StoreSnapshot {
            templates: vec![TemplateBuilder::transaction("房租", 3000.0).build()],
            instances: vec![],
        });
        store.save_to_file(&path).await.unwrap();

        let reloaded = InMemoryEntityStore::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.template_count().await, 1);
        assert_eq!(
            reloaded.snapshot().await.templates,
            store.snapshot().await.templates
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let result = InMemoryEntityStore::load_from_file("/nonexistent/store.json").await;
        assert!(matches!(result, Err(RecurrenceError::Io(_))));
    }
}
