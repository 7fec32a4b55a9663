// src/models/task.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{serde_utils::double_option, validation::non_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    #[schema(example = "Pour foundation")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: Option<Uuid>,
    // TeamMember responsável
    pub assigned_to: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2025-04-15")]
    pub due_date: NaiveDate,

    #[schema(value_type = Option<String>, example = "12500")]
    pub estimated_cost: Option<Decimal>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskFilter {
    /// Só as tarefas deste projeto
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pour foundation")]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2025-04-15")]
    pub due_date: NaiveDate,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid, nullable)]
    pub project_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid, nullable)]
    pub assigned_to: Option<Option<Uuid>>,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.project_id.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
            && self.estimated_cost.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_is_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), r#""in-progress""#);
        let priority: TaskPriority = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(priority, TaskPriority::High);
    }

    #[test]
    fn unassigning_a_task_is_not_an_empty_patch() {
        let patch: TaskPatch = serde_json::from_str(r#"{"assignedTo": null}"#).unwrap();
        assert!(!patch.is_empty());
        assert_eq!(patch.assigned_to, Some(None));
    }
}
