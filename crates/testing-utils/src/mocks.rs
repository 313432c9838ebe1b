//! Mock implementations for repository and notifier traits
//!
//! In-memory mocks for unit testing without a real entity store or
//! notification backend. Each mock can be told to fail specific calls so
//! per-template error isolation can be exercised.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recurrence_domain::{
    InstanceRepository, Notification, Notifier, RecurrenceInstance, RecurrenceTemplate,
    TemplateFilter, TemplatePatch, TemplateRepository,
};
use recurrence_errors::{RecurrenceError, RecurrenceResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mock implementation of TemplateRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockTemplateRepository {
    templates: Arc<Mutex<HashMap<Uuid, RecurrenceTemplate>>>,
    failing_updates: Arc<Mutex<HashSet<Uuid>>>,
    fail_list: Arc<Mutex<bool>>,
    update_calls: Arc<Mutex<Vec<(Uuid, TemplatePatch)>>>,
}

impl MockTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<RecurrenceTemplate>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.templates.lock().unwrap();
            for template in templates {
                map.insert(template.id, template);
            }
        }
        repo
    }

    /// Make every `update` for the given template fail with a storage error
    pub fn fail_updates_for(&self, id: Uuid) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    pub fn fail_list(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    pub fn get(&self, id: Uuid) -> Option<RecurrenceTemplate> {
        self.templates.lock().unwrap().get(&id).cloned()
    }

    pub fn update_calls(&self) -> Vec<(Uuid, TemplatePatch)> {
        self.update_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemplateRepository for MockTemplateRepository {
    async fn create(&self, template: &RecurrenceTemplate) -> RecurrenceResult<RecurrenceTemplate> {
        let mut created = template.clone();
        if created.id.is_nil() {
            created.id = Uuid::new_v4();
        }
        self.templates
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> RecurrenceResult<Option<RecurrenceTemplate>> {
        Ok(self.templates.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, filter: &TemplateFilter) -> RecurrenceResult<Vec<RecurrenceTemplate>> {
        if *self.fail_list.lock().unwrap() {
            return Err(RecurrenceError::storage_error("mock list failure"));
        }
        let templates = self.templates.lock().unwrap();
        let mut matching: Vec<RecurrenceTemplate> = templates
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        matching.sort_by_key(|t| t.created_at);
        Ok(matching)
    }

    async fn update(&self, id: Uuid, patch: &TemplatePatch) -> RecurrenceResult<RecurrenceTemplate> {
        self.update_calls.lock().unwrap().push((id, patch.clone()));
        if self.failing_updates.lock().unwrap().contains(&id) {
            return Err(RecurrenceError::storage_error(format!(
                "mock update failure for {id}"
            )));
        }
        let mut templates = self.templates.lock().unwrap();
        let template = templates
            .get_mut(&id)
            .ok_or_else(|| RecurrenceError::template_not_found(id))?;
        patch.apply_to(template);
        template.updated_at = Utc::now();
        Ok(template.clone())
    }
}

/// Mock implementation of InstanceRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockInstanceRepository {
    instances: Arc<Mutex<Vec<RecurrenceInstance>>>,
    failing_parents: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances(instances: Vec<RecurrenceInstance>) -> Self {
        let repo = Self::new();
        repo.instances.lock().unwrap().extend(instances);
        repo
    }

    /// Make every `create` for instances of the given template fail
    pub fn fail_creates_for(&self, parent_template_id: Uuid) {
        self.failing_parents
            .lock()
            .unwrap()
            .insert(parent_template_id);
    }

    pub fn all(&self) -> Vec<RecurrenceInstance> {
        self.instances.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.instances.lock().unwrap().len()
    }
}

#[async_trait]
impl InstanceRepository for MockInstanceRepository {
    async fn create(&self, instance: &RecurrenceInstance) -> RecurrenceResult<RecurrenceInstance> {
        if self
            .failing_parents
            .lock()
            .unwrap()
            .contains(&instance.parent_template_id)
        {
            return Err(RecurrenceError::storage_error(format!(
                "mock create failure for template {}",
                instance.parent_template_id
            )));
        }
        let mut created = instance.clone();
        created.id = Uuid::new_v4();
        created.created_at = Some(Utc::now());
        self.instances.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_by_parent(
        &self,
        parent_template_id: Uuid,
    ) -> RecurrenceResult<Vec<RecurrenceInstance>> {
        Ok(self
            .instances
            .lock()
            .unwrap()
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
        Ok(self.instances.lock().unwrap().iter().any(|i| {
            i.parent_template_id == parent_template_id && i.occurrence_date == occurrence_date
        }))
    }
}

/// Notifier that records every notification it is asked to send
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing_recipients: Arc<Mutex<HashSet<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> RecurrenceResult<()> {
        if self
            .failing_recipients
            .lock()
            .unwrap()
            .contains(&notification.recipient)
        {
            return Err(RecurrenceError::notification_error(format!(
                "mock delivery failure for {}",
                notification.recipient
            )));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
