use std::sync::Arc;

use recurrence_config::ProcessorConfig;
use recurrence_domain::{
    DeliveryMode, InstanceDetails, InstanceRepository, Notifier, RecurrenceError, SkipReason,
    TemplateFlavor,
};
use recurrence_engine::{project_instance, RecurrenceEngine};
use recurrence_infrastructure::{InMemoryEntityStore, MetricsCollector, StoreSnapshot};
use recurrence_processor::{ProcessingStage, RecurringProcessor};
use recurrence_testing_utils::{
    init_test_logging, ts, MockInstanceRepository, MockTemplateRepository, RecordingNotifier,
    TemplateBuilder,
};

fn build_processor(
    templates: &MockTemplateRepository,
    instances: &MockInstanceRepository,
    notifier: Option<&RecordingNotifier>,
    config: ProcessorConfig,
) -> RecurringProcessor {
    RecurringProcessor::new(
        Arc::new(templates.clone()),
        Arc::new(instances.clone()),
        notifier.map(|n| Arc::new(n.clone()) as Arc<dyn Notifier>),
        RecurrenceEngine::new(),
        config,
        Arc::new(MetricsCollector::new()),
    )
}

#[tokio::test]
async fn test_failing_template_does_not_abort_batch() {
    init_test_logging();
    let good_a = TemplateBuilder::task("standup").due("2024-03-10").build();
    let broken = TemplateBuilder::task("retro").due("2024-03-09").build();
    let good_b = TemplateBuilder::task("planning").due("2024-03-08").build();
    let future = TemplateBuilder::task("offsite").due("2024-04-01").build();

    let templates = MockTemplateRepository::with_templates(vec![
        good_a.clone(),
        broken.clone(),
        good_b.clone(),
        future,
    ]);
    let instances = MockInstanceRepository::new();
    templates.fail_updates_for(broken.id);

    let processor = build_processor(&templates, &instances, None, ProcessorConfig::default());
    let summary = processor
        .process(TemplateFlavor::Task, ts("2024-03-10T12:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.created, 3);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_by_reason.get(SkipReason::NotYetDue), 1);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].template_id, broken.id);
    assert_eq!(summary.errors[0].stage, ProcessingStage::UpdateTemplate);

    assert_eq!(
        templates.get(good_a.id).unwrap().next_occurrence_date,
        Some(ts("2024-03-11"))
    );
    assert_eq!(
        templates.get(good_b.id).unwrap().next_occurrence_date,
        Some(ts("2024-03-09"))
    );
    assert_eq!(
        templates.get(broken.id).unwrap().next_occurrence_date,
        Some(ts("2024-03-09"))
    );
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential_counts() {
    let mut all = Vec::new();
    for i in 0..20 {
        all.push(
            TemplateBuilder::transaction(&format!("subscription {i}"), 9.99)
                .with_pattern("monthly")
                .due("2024-03-01")
                .build(),
        );
    }
    let templates = MockTemplateRepository::with_templates(all);
    let instances = MockInstanceRepository::new();
    let processor = build_processor(
        &templates,
        &instances,
        None,
        ProcessorConfig {
            max_concurrency: 8,
            ..ProcessorConfig::default()
        },
    );

    let summary = processor
        .process(TemplateFlavor::Transaction, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.processed, 20);
    assert_eq!(summary.created, 20);
    assert_eq!(summary.updated, 20);
    assert_eq!(instances.count(), 20);
}

#[tokio::test]
async fn test_exactly_once_does_not_duplicate_stored_occurrence() {
    let template = TemplateBuilder::task("invoice review")
        .with_pattern("weekly")
        .due("2024-03-10")
        .build();
    // 上一次运行写入了实例但没来得及推进指针
    let existing = project_instance(&template, ts("2024-03-10"));
    let templates = MockTemplateRepository::with_templates(vec![template.clone()]);
    let instances = MockInstanceRepository::with_instances(vec![existing]);

    let processor = build_processor(
        &templates,
        &instances,
        None,
        ProcessorConfig {
            delivery_mode: DeliveryMode::ExactlyOnce,
            ..ProcessorConfig::default()
        },
    );
    let summary = processor
        .process(TemplateFlavor::Task, ts("2024-03-10T18:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.deduplicated, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 1);
    assert_eq!(instances.count(), 1);
    assert_eq!(
        templates.get(template.id).unwrap().next_occurrence_date,
        Some(ts("2024-03-17"))
    );
}

#[tokio::test]
async fn test_at_least_once_recreates_occurrence() {
    let template = TemplateBuilder::task("invoice review").due("2024-03-10").build();
    let existing = project_instance(&template, ts("2024-03-10"));
    let templates = MockTemplateRepository::with_templates(vec![template.clone()]);
    let instances = MockInstanceRepository::with_instances(vec![existing]);

    let processor = build_processor(&templates, &instances, None, ProcessorConfig::default());
    let summary = processor
        .process(TemplateFlavor::Task, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.deduplicated, 0);
    assert_eq!(summary.created, 1);
    assert_eq!(instances.list_by_parent(template.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reminder_notification_success_marks_delivered() {
    let template = TemplateBuilder::reminder("pay rent", "tenant@example.com")
        .with_pattern("monthly")
        .build();
    let templates = MockTemplateRepository::with_templates(vec![template.clone()]);
    let instances = MockInstanceRepository::new();
    let notifier = RecordingNotifier::new();

    let processor = build_processor(
        &templates,
        &instances,
        Some(&notifier),
        ProcessorConfig::default(),
    );
    let summary = processor
        .process(TemplateFlavor::Reminder, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.notified, 1);
    assert_eq!(summary.notification_failures, 0);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "tenant@example.com");
    assert_eq!(sent[0].subject, "pay rent");
    assert_eq!(sent[0].body, "Reminder: pay rent");

    match &instances.all()[0].details {
        InstanceDetails::Reminder(details) => assert!(details.delivered),
        other => panic!("expected reminder instance, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reminder_notification_failure_still_advances() {
    let ok = TemplateBuilder::reminder("standup", "team@example.com").build();
    let failing = TemplateBuilder::reminder("renewal", "bounce@example.com").build();
    let templates = MockTemplateRepository::with_templates(vec![ok, failing.clone()]);
    let instances = MockInstanceRepository::new();
    let notifier = RecordingNotifier::new();
    notifier.fail_for("bounce@example.com");

    let processor = build_processor(
        &templates,
        &instances,
        Some(&notifier),
        ProcessorConfig::default(),
    );
    let summary = processor
        .process(TemplateFlavor::Reminder, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.notified, 1);
    assert_eq!(summary.notification_failures, 1);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].template_id, failing.id);
    assert_eq!(summary.errors[0].stage, ProcessingStage::Notify);

    let stored = instances.list_by_parent(failing.id).await.unwrap();
    match &stored[0].details {
        InstanceDetails::Reminder(details) => assert!(!details.delivered),
        other => panic!("expected reminder instance, got {other:?}"),
    }
    assert_eq!(
        templates.get(failing.id).unwrap().next_occurrence_date,
        Some(ts("2024-03-11"))
    );
}

#[tokio::test]
async fn test_close_out_creates_final_instance_and_pauses() {
    let template = TemplateBuilder::transaction("loan repayment", 250.0)
        .with_pattern("monthly")
        .due("2024-03-10")
        .ends("2024-03-31")
        .build();
    let templates = MockTemplateRepository::with_templates(vec![template.clone()]);
    let instances = MockInstanceRepository::new();

    let processor = build_processor(&templates, &instances, None, ProcessorConfig::default());
    let summary = processor
        .process(TemplateFlavor::Transaction, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.closed_out, 1);
    assert_eq!(summary.created, 1);
    let stored = templates.get(template.id).unwrap();
    assert!(stored.is_paused);
    assert_eq!(stored.next_occurrence_date, None);

    // 关闭后的模板在下一次运行中以暂停原因跳过
    let summary = processor
        .process(TemplateFlavor::Transaction, ts("2024-04-10"))
        .await
        .unwrap();
    assert_eq!(summary.skipped_by_reason.get(SkipReason::Paused), 1);
    assert_eq!(instances.count(), 1);
}

#[tokio::test]
async fn test_skip_counts_by_reason() {
    let templates = MockTemplateRepository::with_templates(vec![
        TemplateBuilder::task("paused").paused().build(),
        TemplateBuilder::task("expired").ends("2024-01-01").build(),
        TemplateBuilder::task("undated").without_due_date().build(),
        TemplateBuilder::task("later").due("2024-06-01").build(),
        TemplateBuilder::transaction("other flavor", 1.0).build(),
    ]);
    let instances = MockInstanceRepository::new();

    let processor = build_processor(&templates, &instances, None, ProcessorConfig::default());
    let summary = processor
        .process(TemplateFlavor::Task, ts("2024-03-10"))
        .await
        .unwrap();

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.skipped_by_reason.paused, 1);
    assert_eq!(summary.skipped_by_reason.expired, 1);
    assert_eq!(summary.skipped_by_reason.not_yet_due, 2);
    assert_eq!(instances.count(), 0);
    assert!(templates.update_calls().is_empty());
}

#[tokio::test]
async fn test_list_failure_aborts_run() {
    let templates = MockTemplateRepository::with_templates(vec![TemplateBuilder::task("a").build()]);
    templates.fail_list();
    let instances = MockInstanceRepository::new();

    let processor = build_processor(&templates, &instances, None, ProcessorConfig::default());
    let result = processor.process(TemplateFlavor::Task, ts("2024-03-10")).await;

    assert!(matches!(result, Err(RecurrenceError::Storage(_))));
    assert_eq!(instances.count(), 0);
}

#[tokio::test]
async fn test_process_all_against_in_memory_store() {
    let store = Arc::new(InMemoryEntityStore::from_snapshot(StoreSnapshot {
        templates: vec![
            TemplateBuilder::task("backup check").build(),
            TemplateBuilder::transaction("hosting", 40.0)
                .with_pattern("monthly")
                .build(),
            TemplateBuilder::reminder("timesheet", "staff@example.com")
                .with_pattern("weekly")
                .build(),
        ],
        instances: vec![],
    }));
    let notifier = RecordingNotifier::new();

    let processor = RecurringProcessor::new(
        store.clone(),
        store.clone(),
        Some(Arc::new(notifier.clone()) as Arc<dyn Notifier>),
        RecurrenceEngine::new(),
        ProcessorConfig::default(),
        Arc::new(MetricsCollector::new()),
    );

    let summaries = processor
        .process_all(&TemplateFlavor::all(), ts("2024-03-10T08:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summaries.len(), 3);
    assert!(summaries.iter().all(|s| s.created == 1 && s.updated == 1));
    assert_eq!(store.instance_count().await, 3);
    assert_eq!(notifier.sent().len(), 1);

    // 同一天再次运行，所有模板都已推进到未来
    let summaries = processor
        .process_all(&TemplateFlavor::all(), ts("2024-03-10T20:00:00Z"))
        .await
        .unwrap();
    assert!(summaries.iter().all(|s| s.created == 0 && s.skipped == 1));
    assert_eq!(store.instance_count().await, 3);
}
