// src/models/admin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::AppRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    // O status de billing é por sessão; não há como contar assinantes daqui.
    pub premium_users: i64,
    pub standard_users: i64,
    pub total_projects: i64,
    pub total_tasks: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRole {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    // Sem linha em user_roles = usuário comum
    pub role: Option<AppRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRolePayload {
    #[schema(example = "admin")]
    pub role: AppRole,
}
