// src/models/contract.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::project::ProjectStatus;

// --- Contexto enviado ao serviço de IA (generate-contract) ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractProject {
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub status: ProjectStatus,
    pub progress: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractMember {
    pub name: String,
    pub specialty: String,
    // A função de IA lê este campo em snake_case
    pub daily_wage: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    pub project: ContractProject,
    pub customer: Option<ContractCustomer>,
    pub team_members: Vec<ContractMember>,
}

// --- API ---

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractDraft {
    /// Texto do contrato em Markdown
    pub contract: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContractPdfPayload {
    #[validate(length(min = 1, message = "required"))]
    pub contract: String,
}
