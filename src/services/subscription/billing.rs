// src/services/subscription/billing.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    models::subscription::BillingStatus,
    services::edge::{error_message, EdgeClient},
};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Falha de comunicação com o billing: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Billing respondeu {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Colaborador de billing (checkout, portal, status da assinatura).
#[async_trait]
pub trait BillingClient: Send + Sync {
    async fn check_status(&self, token: &str) -> Result<BillingStatus, BillingError>;

    /// `None` quando o billing não devolve URL.
    async fn create_checkout_session(&self, token: &str, price_id: &str) -> Result<Option<String>, BillingError>;

    async fn open_portal(&self, token: &str) -> Result<Option<String>, BillingError>;
}

#[derive(Debug, Deserialize)]
struct RedirectBody {
    url: Option<String>,
}

/// Implementação sobre as edge functions `check-subscription`, `create-checkout` e `customer-portal`.
#[derive(Clone)]
pub struct HttpBillingClient {
    edge: EdgeClient,
}

impl HttpBillingClient {
    pub fn new(edge: EdgeClient) -> Self {
        Self { edge }
    }

    async fn redirect(&self, function: &str, token: &str, body: serde_json::Value) -> Result<Option<String>, BillingError> {
        let response = self.edge.function(function, token, &body).send().await?;
        if response.status() != StatusCode::OK {
            return Err(rejected(response).await);
        }
        let body: RedirectBody = response.json().await?;
        Ok(body.url.filter(|url| !url.is_empty()))
    }
}

async fn rejected(response: reqwest::Response) -> BillingError {
    let status = response.status().as_u16();
    BillingError::Rejected {
        status,
        message: error_message(response).await,
    }
}

#[async_trait]
impl BillingClient for HttpBillingClient {
    async fn check_status(&self, token: &str) -> Result<BillingStatus, BillingError> {
        let response = self
            .edge
            .function("check-subscription", token, &json!({}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json::<BillingStatus>().await?)
    }

    async fn create_checkout_session(&self, token: &str, price_id: &str) -> Result<Option<String>, BillingError> {
        self.redirect("create-checkout", token, json!({ "priceId": price_id })).await
    }

    async fn open_portal(&self, token: &str) -> Result<Option<String>, BillingError> {
        self.redirect("customer-portal", token, json!({})).await
    }
}
