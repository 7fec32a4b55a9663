// src/models/subscription.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// --- Planos ---

pub const STANDARD_MAX_PROJECTS: u32 = 3;
pub const STANDARD_MAX_TEAM_MEMBERS: u32 = 2;
// O build empacotado (app mobile) já usou 4 aqui; por isso o valor vem da configuração.
pub const STANDARD_MAX_PHOTOS_PER_PROJECT: u32 = 2;
pub const PREMIUM_MAX_PHOTOS_PER_PROJECT: u32 = 4;

pub const PREMIUM_PRODUCT_ID: &str = "prod_TiJnuqsH5SgpBF";
pub const PREMIUM_PRICE_ID: &str = "price_1Skt9sBqz5IswCfZjnSobzU9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionTier {
    Standard,
    Premium,
}

/// Limites de um plano. `None` = ilimitado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub max_projects: Option<u32>,
    pub max_team_members: Option<u32>,
    pub max_photos_per_project: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub standard: TierLimits,
    pub premium: TierLimits,
}

impl PlanLimits {
    pub fn with_standard_photo_cap(max_photos: u32) -> Self {
        let mut limits = Self::default();
        limits.standard.max_photos_per_project = max_photos;
        limits
    }

    pub fn for_tier(&self, tier: SubscriptionTier) -> &TierLimits {
        match tier {
            SubscriptionTier::Standard => &self.standard,
            SubscriptionTier::Premium => &self.premium,
        }
    }
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            standard: TierLimits {
                max_projects: Some(STANDARD_MAX_PROJECTS),
                max_team_members: Some(STANDARD_MAX_TEAM_MEMBERS),
                max_photos_per_project: STANDARD_MAX_PHOTOS_PER_PROJECT,
            },
            premium: TierLimits {
                max_projects: None,
                max_team_members: None,
                max_photos_per_project: PREMIUM_MAX_PHOTOS_PER_PROJECT,
            },
        }
    }
}

// Recursos contados contra o limite do plano.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum LimitedResource {
    Projects,
    TeamMembers,
    Photos,
}

// Funcionalidades exclusivas do Premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    AdvancedReports,
    ContractGeneration,
    MaterialSuggestions,
}

// --- Estado da assinatura ---

/// Resposta do serviço de billing (`check-subscription`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingStatus {
    #[serde(default)]
    pub subscribed: bool,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub subscription_end: Option<DateTime<Utc>>,
}

/// O que o dashboard enxerga da assinatura.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub subscribed: bool,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SubscriptionState {
    /// Assinante E do produto Premium conhecido.
    pub fn is_premium(&self, premium_product_id: &str) -> bool {
        self.subscribed && self.product_id.as_deref() == Some(premium_product_id)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub state: SubscriptionState,
    pub is_premium: bool,
}

// --- Checkout / Portal ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    // Se omitido, usa o preço Premium configurado.
    #[schema(example = "price_1Skt9sBqz5IswCfZjnSobzU9")]
    pub price_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectResponse {
    #[schema(example = "https://checkout.stripe.com/c/pay/cs_test_123")]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutReturnPayload {
    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://app.example.com/?subscription=success")]
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReturnResponse {
    /// URL sem o marcador, para o cliente substituir no histórico.
    pub url: String,
    pub refresh_scheduled: bool,
}

// --- Catálogo de planos ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub tier: SubscriptionTier,
    pub name: String,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    #[schema(value_type = String, example = "49.99")]
    pub price: rust_decimal::Decimal,
    #[schema(example = "TRY")]
    pub currency: String,
    #[schema(example = "₺50")]
    pub formatted_price: String,
    pub limits: TierLimits,
    pub features: Vec<String>,
}
