use recurrence_domain::{
    Decision, InstanceDetails, RecurrencePattern, SkipReason, TemplatePatch, UpdateValue,
};
use recurrence_engine::{advance, RecurrenceEngine};
use recurrence_testing_utils::{ts, TemplateBuilder};

#[test]
fn test_paused_template_always_skipped() {
    let engine = RecurrenceEngine::new();
    let cases = [
        TemplateBuilder::task("paused due").paused().due("2024-01-01").build(),
        TemplateBuilder::transaction("paused expired", 10.0)
            .paused()
            .ends("2020-01-01")
            .build(),
        TemplateBuilder::reminder("paused no date", "a@example.com")
            .paused()
            .without_due_date()
            .build(),
    ];

    for template in &cases {
        assert_eq!(
            engine.evaluate(template, ts("2024-03-10T15:00:00Z")),
            Decision::Skip {
                reason: SkipReason::Paused
            }
        );
    }
}

#[test]
fn test_expired_template_skipped() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::transaction("rent", 1200.0)
        .with_pattern("monthly")
        .due("2024-03-01")
        .ends("2024-03-09T23:59:59Z")
        .build();

    assert_eq!(
        engine.evaluate(&template, ts("2024-03-10T00:00:01Z")).skip_reason(),
        Some(SkipReason::Expired)
    );
}

#[test]
fn test_end_date_today_is_not_expired() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::transaction("rent", 1200.0)
        .due("2024-03-10")
        .ends("2024-03-10T06:00:00Z")
        .build();

    assert!(!engine
        .evaluate(&template, ts("2024-03-10T20:00:00Z"))
        .is_skip());
}

#[test]
fn test_future_due_date_not_yet_due() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::task("tomorrow").due("2024-03-11T00:00:00Z").build();

    assert_eq!(
        engine
            .evaluate(&template, ts("2024-03-10T23:59:59Z"))
            .skip_reason(),
        Some(SkipReason::NotYetDue)
    );
}

#[test]
fn test_same_day_later_time_is_due() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::task("later today")
        .due("2024-03-10T18:00:00Z")
        .build();

    // 同一天内，到期时间晚于当前时刻也视为到期
    assert!(!engine
        .evaluate(&template, ts("2024-03-10T09:00:00Z"))
        .is_skip());
}

#[test]
fn test_evaluate_is_pure() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::reminder("invoice", "billing@example.com")
        .with_pattern("quarterly")
        .due("2024-03-10T09:15:00Z")
        .build();
    let now = ts("2024-03-12T10:00:00Z");

    assert_eq!(
        engine.evaluate(&template, now),
        engine.evaluate(&template, now)
    );
}

#[test]
fn test_advance_jan_31_monthly() {
    let next = advance(ts("2024-01-31"), &RecurrencePattern::Monthly, 1).unwrap();
    assert_eq!(next, ts("2024-02-29"));
}

#[test]
fn test_daily_spawn_scenario() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::transaction("coffee", 4.5)
        .with_pattern("daily")
        .due("2024-03-10T00:00:00Z")
        .build();

    let decision = engine.evaluate(&template, ts("2024-03-10T15:00:00Z"));
    match decision {
        Decision::Spawn {
            instance,
            template_update,
        } => {
            assert_eq!(instance.parent_template_id, template.id);
            assert_eq!(instance.occurrence_date, ts("2024-03-10T00:00:00Z"));
            assert!(!instance.is_recurring);
            assert!(matches!(instance.details, InstanceDetails::Transaction(_)));
            assert_eq!(
                template_update,
                TemplatePatch::advance_to(ts("2024-03-11T00:00:00Z"))
            );
        }
        other => panic!("expected spawn, got {other:?}"),
    }
}

#[test]
fn test_close_out_scenario_still_spawns() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::transaction("coffee", 4.5)
        .with_pattern("daily")
        .due("2024-03-10T00:00:00Z")
        .ends("2024-03-10")
        .build();

    let decision = engine.evaluate(&template, ts("2024-03-10T15:00:00Z"));
    match decision {
        Decision::CloseOut {
            instance,
            template_update,
        } => {
            assert_eq!(instance.occurrence_date, ts("2024-03-10T00:00:00Z"));
            assert_eq!(template_update.is_paused, UpdateValue::Set(true));
            assert!(template_update.next_occurrence_date.is_unset());
        }
        other => panic!("expected close-out, got {other:?}"),
    }
}

#[test]
fn test_biweekly_ignores_interval_scenario() {
    let engine = RecurrenceEngine::new();
    for interval in [1, 3, 10] {
        let template = TemplateBuilder::task("payroll")
            .with_pattern("biweekly")
            .with_interval(interval)
            .due("2024-01-01")
            .build();

        let decision = engine.evaluate(&template, ts("2024-01-01"));
        assert_eq!(
            decision.template_update(),
            Some(&TemplatePatch::advance_to(ts("2024-01-15")))
        );
    }
}

#[test]
fn test_unknown_pattern_scenario() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::reminder("check-in", "ops@example.com")
        .with_pattern("fortnightly")
        .due("2024-01-31")
        .build();

    let decision = engine.evaluate(&template, ts("2024-01-31"));
    assert_eq!(
        decision.template_update(),
        Some(&TemplatePatch::advance_to(ts("2024-02-29")))
    );
}

#[test]
fn test_non_task_flavors_ignore_interval() {
    let engine = RecurrenceEngine::new();
    let transaction = TemplateBuilder::transaction("subscription", 29.0)
        .with_pattern("monthly")
        .with_interval(6)
        .due("2024-03-10")
        .build();
    let task = TemplateBuilder::task("board review")
        .with_pattern("monthly")
        .with_interval(6)
        .due("2024-03-10")
        .build();

    let now = ts("2024-03-10");
    assert_eq!(
        engine.evaluate(&transaction, now).template_update(),
        Some(&TemplatePatch::advance_to(ts("2024-04-10")))
    );
    assert_eq!(
        engine.evaluate(&task, now).template_update(),
        Some(&TemplatePatch::advance_to(ts("2024-09-10")))
    );
}

#[test]
fn test_missed_occurrences_are_not_batched() {
    let engine = RecurrenceEngine::new();
    let template = TemplateBuilder::task("daily standup")
        .with_pattern("daily")
        .due("2024-03-01")
        .build();

    // 落后多天时只生成一个实例，指针只前进一个周期
    let decision = engine.evaluate(&template, ts("2024-03-10"));
    assert_eq!(
        decision.instance().map(|i| i.occurrence_date),
        Some(ts("2024-03-01"))
    );
    assert_eq!(
        decision.template_update(),
        Some(&TemplatePatch::advance_to(ts("2024-03-02")))
    );
}
