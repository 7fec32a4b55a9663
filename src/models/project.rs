// src/models/project.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{serde_utils::double_option, validation::non_negative};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    // Legados: ainda existem linhas antigas com estes valores.
    Pending,
    OnHold,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    #[schema(example = "Villa Renovation")]
    pub title: String,

    pub description: Option<String>,

    pub status: ProjectStatus,

    #[schema(example = 65)]
    pub progress: i32,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-09-30")]
    pub end_date: NaiveDate,

    // IDs de TeamMember
    pub assigned_team: Vec<Uuid>,

    pub customer_id: Option<Uuid>,

    // Valores monetários: nulo no banco conta como zero
    #[schema(value_type = Option<String>, example = "500000")]
    pub budget: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "325000")]
    pub actual_cost: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "600000")]
    pub revenue: Option<Decimal>,

    // URLs públicas, em ordem de upload
    pub photos: Vec<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Barra de progresso do orçamento: largura limitada a 100, rótulo sem limite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationView {
    #[schema(value_type = String, example = "65")]
    pub bar_width: Decimal,
    #[schema(example = "65%")]
    pub label: String,
}

/// Projeto com os valores derivados para a listagem.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    #[serde(flatten)]
    pub project: Project,
    pub budget_utilization: UtilizationView,
    #[schema(example = "₺500.000")]
    pub formatted_budget: String,
    pub formatted_actual_cost: String,
    pub formatted_revenue: String,
    #[schema(example = "01.03.2025")]
    pub formatted_start_date: String,
    pub formatted_end_date: String,
    pub max_photos: u32,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Villa Renovation")]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "progress_range"))]
    pub progress: i32,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-09-30")]
    pub end_date: NaiveDate,

    #[serde(default)]
    pub assigned_team: Vec<Uuid>,

    pub customer_id: Option<Uuid>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub revenue: Option<Decimal>,
}

/// Atualização parcial: só os campos presentes mudam.
/// `null` em campos anuláveis limpa o valor.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,

    pub status: Option<ProjectStatus>,

    #[validate(range(min = 0, max = 100, message = "progress_range"))]
    pub progress: Option<i32>,

    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,

    pub assigned_team: Option<Vec<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid, nullable)]
    pub customer_id: Option<Option<Uuid>>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub revenue: Option<Decimal>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.progress.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.assigned_team.is_none()
            && self.customer_id.is_none()
            && self.budget.is_none()
            && self.actual_cost.is_none()
            && self.revenue.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemovePhotoPayload {
    #[schema(example = "https://storage.example.com/storage/v1/object/public/project-photos/u/p/a.jpg")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_statuses_use_kebab_case() {
        let status: ProjectStatus = serde_json::from_str(r#""on-hold""#).unwrap();
        assert_eq!(status, ProjectStatus::OnHold);
        assert_eq!(serde_json::to_string(&ProjectStatus::Planning).unwrap(), r#""planning""#);
    }

    #[test]
    fn patch_rejects_out_of_range_progress_and_negative_money() {
        let patch: ProjectPatch =
            serde_json::from_str(r#"{"progress": 101, "budget": -5}"#).unwrap();
        let errors = patch.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("progress"));
        assert!(fields.contains_key("budget"));
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: ProjectPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());

        let clear_customer: ProjectPatch =
            serde_json::from_str(r#"{"customerId": null}"#).unwrap();
        assert!(!clear_customer.is_empty());
        assert_eq!(clear_customer.customer_id, Some(None));
    }
}
