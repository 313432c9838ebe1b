use chrono::{DateTime, Utc};
use uuid::Uuid;

use recurrence_domain::{
    InstanceDetails, RecurrenceInstance, RecurrenceTemplate, ReminderDetails,
    ReminderInstanceDetails, TaskDetails, TaskInstanceDetails, TaskStatus, TemplateDetails,
    TransactionDetails, TransactionInstanceDetails,
};

/// 把某一类模板的业务字段投影为实例的业务字段
pub trait InstanceProjection {
    type Details;

    fn project(&self, details: &Self::Details) -> InstanceDetails;
}

pub struct TaskProjection;

impl InstanceProjection for TaskProjection {
    type Details = TaskDetails;

    fn project(&self, details: &TaskDetails) -> InstanceDetails {
        InstanceDetails::Task(TaskInstanceDetails {
            title: details.title.clone(),
            description: details.description.clone(),
            priority: details.priority,
            assigned_to: details.assigned_to.clone(),
            status: TaskStatus::Todo,
        })
    }
}

pub struct TransactionProjection;

impl InstanceProjection for TransactionProjection {
    type Details = TransactionDetails;

    fn project(&self, details: &TransactionDetails) -> InstanceDetails {
        InstanceDetails::Transaction(TransactionInstanceDetails {
            amount: details.amount,
            transaction_type: details.transaction_type,
            category: details.category.clone(),
            description: details.description.clone(),
            account: details.account.clone(),
        })
    }
}

pub struct ReminderProjection;

impl InstanceProjection for ReminderProjection {
    type Details = ReminderDetails;

    fn project(&self, details: &ReminderDetails) -> InstanceDetails {
        InstanceDetails::Reminder(ReminderInstanceDetails {
            title: details.title.clone(),
            message: details.message.clone(),
            recipient: details.recipient.clone(),
            delivered: false,
        })
    }
}

/// 为模板的一次发生构造实例（ID与创建时间留给存储层分配）
pub fn project_instance(
    template: &RecurrenceTemplate,
    occurrence_date: DateTime<Utc>,
) -> RecurrenceInstance {
    let details = match &template.details {
        TemplateDetails::Task(task) => TaskProjection.project(task),
        TemplateDetails::Transaction(tx) => TransactionProjection.project(tx),
        TemplateDetails::Reminder(reminder) => ReminderProjection.project(reminder),
    };

    RecurrenceInstance {
        id: Uuid::nil(),
        parent_template_id: template.id,
        created_by: template.created_by.clone(),
        occurrence_date,
        is_recurring: false,
        details,
        created_at: None,
    }
}
