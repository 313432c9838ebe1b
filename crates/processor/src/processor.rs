use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use recurrence_config::ProcessorConfig;
use recurrence_domain::{
    Decision, DeliveryMode, InstanceDetails, InstanceRepository, Notification, Notifier,
    RecurrenceInstance, RecurrenceTemplate, TemplateFilter, TemplateFlavor, TemplatePatch,
    TemplateRepository,
};
use recurrence_engine::RecurrenceEngine;
use recurrence_errors::{RecurrenceError, RecurrenceResult};
use recurrence_infrastructure::{MetricsCollector, StructuredLogger};
use tracing::{debug, info, Instrument};

use crate::summary::{ProcessingError, ProcessingStage, ProcessingSummary, TemplateOutcome};

pub struct RecurringProcessor {
    template_repo: Arc<dyn TemplateRepository>,
    instance_repo: Arc<dyn InstanceRepository>,
    notifier: Option<Arc<dyn Notifier>>,
    engine: RecurrenceEngine,
    config: ProcessorConfig,
    metrics: Arc<MetricsCollector>,
}

impl RecurringProcessor {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        instance_repo: Arc<dyn InstanceRepository>,
        notifier: Option<Arc<dyn Notifier>>,
        engine: RecurrenceEngine,
        config: ProcessorConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            template_repo,
            instance_repo,
            notifier,
            engine,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// 按顺序处理多个类别，每个类别返回一份汇总
    pub async fn process_all(
        &self,
        flavors: &[TemplateFlavor],
        now: DateTime<Utc>,
    ) -> RecurrenceResult<Vec<ProcessingSummary>> {
        let mut summaries = Vec::with_capacity(flavors.len());
        for flavor in flavors {
            summaries.push(self.process(*flavor, now).await?);
        }
        Ok(summaries)
    }

    /// 处理某一类别的全部周期模板
    ///
    /// 只有列出模板失败会返回错误；单个模板的存储或通知错误记录在汇总中。
    pub async fn process(
        &self,
        flavor: TemplateFlavor,
        now: DateTime<Utc>,
    ) -> RecurrenceResult<ProcessingSummary> {
        let span = tracing::info_span!("process_recurring", run.flavor = flavor.as_str());
        async move {
            let start_time = Instant::now();
            info!("开始处理周期{}模板, 评估时间 {}", flavor, now);

            let templates = self
                .template_repo
                .list(&TemplateFilter::recurring(flavor))
                .await?;
            debug!("共列出 {} 个周期{}模板", templates.len(), flavor);

            let concurrency = self.config.max_concurrency.max(1);
            let outcomes: Vec<TemplateOutcome> = stream::iter(templates)
                .map(|template| self.process_template(template, now))
                .buffer_unordered(concurrency)
                .collect()
                .await;

            let mut summary = ProcessingSummary::new(flavor, now);
            for outcome in outcomes {
                summary.record(outcome);
            }
            summary.duration = start_time.elapsed();

            self.metrics
                .record_run_duration(flavor, summary.duration.as_secs_f64());
            StructuredLogger::log_processing_run_complete(
                flavor,
                summary.processed,
                summary.created,
                summary.updated,
                summary.skipped,
                summary.closed_out,
                summary.errored,
                summary.duration.as_millis() as u64,
            );
            Ok::<_, RecurrenceError>(summary)
        }
        .instrument(span)
        .await
    }

    /// 评估并落地单个模板：先写实例，再推进指针
    pub async fn process_template(
        &self,
        template: RecurrenceTemplate,
        now: DateTime<Utc>,
    ) -> TemplateOutcome {
        let span = tracing::debug_span!("process_template", template.id = %template.id);
        async move {
            let flavor = template.flavor();
            let decision = self.engine.evaluate(&template, now);
            self.metrics.record_evaluation(flavor, decision.kind());

            let (instance, patch, closes_out) = match decision {
                Decision::Skip { reason } => {
                    self.metrics.record_skip(flavor, reason);
                    StructuredLogger::log_template_skipped(template.id, flavor, reason);
                    return TemplateOutcome::skipped(reason);
                }
                Decision::Spawn {
                    instance,
                    template_update,
                } => (instance, template_update, false),
                Decision::CloseOut {
                    instance,
                    template_update,
                } => (instance, template_update, true),
            };

            let mut outcome = TemplateOutcome::default();
            if let Err((stage, e)) = self
                .apply(&template, instance, &patch, closes_out, &mut outcome)
                .await
            {
                self.metrics.record_processing_error(flavor);
                StructuredLogger::log_template_failed(
                    template.id,
                    flavor,
                    &template.entity_description(),
                    &e,
                );
                outcome.errors.push(processing_error(&template, stage, &e));
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn apply(
        &self,
        template: &RecurrenceTemplate,
        mut instance: RecurrenceInstance,
        patch: &TemplatePatch,
        closes_out: bool,
        outcome: &mut TemplateOutcome,
    ) -> Result<(), (ProcessingStage, RecurrenceError)> {
        let flavor = template.flavor();

        let already_stored = match self.config.delivery_mode {
            DeliveryMode::AtLeastOnce => false,
            DeliveryMode::ExactlyOnce => self
                .instance_repo
                .exists_for_occurrence(template.id, instance.occurrence_date)
                .await
                .map_err(|e| (ProcessingStage::DuplicateCheck, e))?,
        };

        if already_stored {
            outcome.deduplicated = true;
            self.metrics.record_instance_deduplicated(flavor);
            StructuredLogger::log_instance_deduplicated(
                template.id,
                flavor,
                instance.occurrence_date,
            );
        } else {
            if let InstanceDetails::Reminder(details) = &mut instance.details {
                if let Some(notifier) = &self.notifier {
                    let notification = Notification::for_reminder(details);
                    match notifier.send(&notification).await {
                        Ok(()) => {
                            details.delivered = true;
                            outcome.notification_delivered = Some(true);
                            self.metrics.record_notification(true);
                            StructuredLogger::log_notification(
                                template.id,
                                &notification.recipient,
                                true,
                                None,
                            );
                        }
                        Err(e) => {
                            outcome.notification_delivered = Some(false);
                            self.metrics.record_notification(false);
                            StructuredLogger::log_notification(
                                template.id,
                                &notification.recipient,
                                false,
                                Some(&e.to_string()),
                            );
                            outcome
                                .errors
                                .push(processing_error(template, ProcessingStage::Notify, &e));
                        }
                    }
                } else {
                    debug!("未配置通知器，提醒 {} 不发送通知", template.id);
                }
            }

            let created = self
                .instance_repo
                .create(&instance)
                .await
                .map_err(|e| (ProcessingStage::CreateInstance, e))?;
            outcome.instance_created = true;
            self.metrics.record_instance_created(flavor);
            StructuredLogger::log_instance_spawned(
                template.id,
                flavor,
                created.id,
                created.occurrence_date,
            );
        }

        let updated = self
            .template_repo
            .update(template.id, patch)
            .await
            .map_err(|e| (ProcessingStage::UpdateTemplate, e))?;
        outcome.template_updated = true;

        if closes_out {
            outcome.closed_out = true;
            self.metrics.record_close_out(flavor);
            StructuredLogger::log_template_closed_out(template.id, flavor);
        } else {
            StructuredLogger::log_template_advanced(
                template.id,
                flavor,
                updated.next_occurrence_date,
            );
        }
        Ok(())
    }
}

fn processing_error(
    template: &RecurrenceTemplate,
    stage: ProcessingStage,
    error: &RecurrenceError,
) -> ProcessingError {
    ProcessingError {
        template_id: template.id,
        description: template.details.summary().to_string(),
        stage,
        message: error.to_string(),
    }
}
