// src/models/team.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::non_negative;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    #[schema(example = "Ahmet Yılmaz")]
    pub name: String,
    #[schema(example = "+90 555 123 45 67")]
    pub phone: String,
    #[schema(example = "Usta")]
    pub specialty: String,

    #[schema(value_type = Option<String>, example = "1500")]
    pub daily_wage: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_receivable: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_paid: Option<Decimal>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Membro com saldo e estimativa mensal já calculados.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberView {
    #[serde(flatten)]
    pub member: TeamMember,
    #[schema(value_type = String)]
    pub balance: Decimal,
    #[schema(value_type = String)]
    pub estimated_monthly_wage: Decimal,
    #[schema(example = "₺39.000")]
    pub formatted_monthly_wage: String,
    pub formatted_balance: String,
}

/// Tarefas atribuídas a um membro, por status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberTaskRollup {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberSummary {
    pub member: TeamMemberView,
    pub tasks: MemberTaskRollup,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ahmet Yılmaz")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    pub specialty: String,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub daily_wage: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_receivable: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_paid: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub specialty: Option<String>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub daily_wage: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_receivable: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_paid: Option<Decimal>,
}

impl TeamMemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.specialty.is_none()
            && self.daily_wage.is_none()
            && self.total_receivable.is_none()
            && self.total_paid.is_none()
    }
}
