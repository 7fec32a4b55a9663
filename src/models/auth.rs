// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::entitlement::EntitlementSnapshot;
use super::subscription::SubscriptionResponse;

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    #[serde(default)]
    pub email: Option<String>,
}

/// Sessão autenticada: quem é o usuário e com qual token ele fala com os colaboradores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    // Repassado ao billing/storage/IA em nome do usuário
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
    pub subscription: SubscriptionResponse,
    pub entitlements: EntitlementSnapshot,
}
