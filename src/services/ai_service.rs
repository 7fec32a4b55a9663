// src/services/ai_service.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::edge::{error_message, EdgeClient};
use crate::{
    common::error::AppError,
    models::{contract::ContractRequest, material::SuggestedMaterial},
};

#[derive(Debug, Error)]
pub enum AiError {
    // Mensagem vinda do serviço, mostrada como está
    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("Falha no serviço de IA: {0}")]
    Failed(String),

    #[error("Falha de comunicação com o serviço de IA: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<AiError> for AppError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::RateLimited(message) => AppError::AiRateLimited(message),
            AiError::QuotaExceeded(message) => AppError::AiQuotaExceeded(message),
            other => AppError::Collaborator(other.to_string()),
        }
    }
}

/// Colaborador de redação por IA. Sem retentativas: 429/402 voltam direto ao usuário.
#[async_trait]
pub trait AiDraftingClient: Send + Sync {
    /// Minuta de contrato em Markdown.
    async fn generate_contract(&self, token: &str, request: &ContractRequest) -> Result<String, AiError>;

    async fn suggest_materials(
        &self,
        token: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Vec<SuggestedMaterial>, AiError>;
}

#[derive(Debug, Deserialize)]
struct ContractBody {
    contract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsBody {
    #[serde(default)]
    materials: Vec<SuggestedMaterial>,
}

#[derive(Clone)]
pub struct HttpAiClient {
    edge: EdgeClient,
}

impl HttpAiClient {
    pub fn new(edge: EdgeClient) -> Self {
        Self { edge }
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response).await;
    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(AiError::RateLimited(message))
    } else if status == StatusCode::PAYMENT_REQUIRED {
        Err(AiError::QuotaExceeded(message))
    } else {
        Err(AiError::Failed(message))
    }
}

#[async_trait]
impl AiDraftingClient for HttpAiClient {
    async fn generate_contract(&self, token: &str, request: &ContractRequest) -> Result<String, AiError> {
        let response = self.edge.function("generate-contract", token, request).send().await?;
        let body: ContractBody = check(response).await?.json().await?;

        body.contract
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AiError::Failed("resposta sem contrato".to_string()))
    }

    async fn suggest_materials(
        &self,
        token: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Vec<SuggestedMaterial>, AiError> {
        let body = json!({ "projectTitle": title, "projectDescription": description });
        let response = self.edge.function("suggest-materials", token, &body).send().await?;
        let body: SuggestionsBody = check(response).await?.json().await?;

        Ok(body.materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_quota_keep_the_service_message() {
        let message = "Çok fazla istek gönderildi, lütfen biraz bekleyin.";
        match AppError::from(AiError::RateLimited(message.to_string())) {
            AppError::AiRateLimited(m) => assert_eq!(m, message),
            other => panic!("inesperado: {:?}", other),
        }
        assert!(matches!(
            AppError::from(AiError::QuotaExceeded("Kredi yetersiz".into())),
            AppError::AiQuotaExceeded(_)
        ));
        assert!(matches!(AppError::from(AiError::Failed("x".into())), AppError::Collaborator(_)));
    }
}
