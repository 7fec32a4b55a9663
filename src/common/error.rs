// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::subscription::{Feature, LimitedResource},
};

// Erro interno da aplicação. Os serviços só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Nenhum campo para atualizar")]
    EmptyPatch,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Limite do plano atingido para {resource:?}: {current}/{limit}")]
    PlanLimitReached {
        resource: LimitedResource,
        current: i64,
        limit: i64,
    },

    #[error("Recurso exclusivo do Premium: {0:?}")]
    FeatureLocked(Feature),

    #[error("Acesso restrito a administradores")]
    AdminRequired,

    #[error("Não foi possível criar a sessão de checkout")]
    CheckoutUnavailable,

    #[error("Não foi possível abrir o portal do cliente")]
    PortalUnavailable,

    // Mensagens do serviço de IA são repassadas literalmente ao usuário.
    #[error("{0}")]
    AiRateLimited(String),

    #[error("{0}")]
    AiQuotaExceeded(String),

    #[error("Falha em serviço externo: {0}")]
    Collaborator(String),

    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedMediaType(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O corpo de erro que realmente sai na resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Chave do catálogo de mensagens.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmptyPatch => "empty_patch",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::NotFound(_) => "not_found",
            AppError::PlanLimitReached { resource, .. } => match resource {
                LimitedResource::Projects => "projects_limit_reached",
                LimitedResource::TeamMembers => "team_members_limit_reached",
                LimitedResource::Photos => "photos_limit_reached",
            },
            AppError::FeatureLocked(_) => "feature_locked",
            AppError::AdminRequired => "admin_required",
            AppError::CheckoutUnavailable => "checkout_unavailable",
            AppError::PortalUnavailable => "portal_unavailable",
            AppError::AiRateLimited(_) => "ai_rate_limited",
            AppError::AiQuotaExceeded(_) => "ai_quota_exceeded",
            AppError::Collaborator(_) => "collaborator_error",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::EmptyPatch => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PlanLimitReached { .. }
            | AppError::FeatureLocked(_)
            | AppError::AdminRequired => StatusCode::FORBIDDEN,
            AppError::AiRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::AiQuotaExceeded(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::CheckoutUnavailable
            | AppError::PortalUnavailable
            | AppError::Collaborator(_) => StatusCode::BAD_GATEWAY,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.lang();
        let status = self.status();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            Value::String(i18n.translate(lang, &code))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                ApiError {
                    status,
                    error: i18n.translate(lang, self.code()),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::PlanLimitReached { resource, current, limit } => ApiError {
                status,
                error: i18n.translate_with(
                    lang,
                    self.code(),
                    &[("current", current.to_string()), ("limit", limit.to_string())],
                ),
                details: Some(json!({
                    "resource": resource,
                    "current": current,
                    "limit": limit,
                })),
            },
            AppError::FeatureLocked(feature) => ApiError {
                status,
                error: i18n.translate(lang, self.code()),
                details: Some(json!({ "feature": feature })),
            },
            AppError::AiRateLimited(message) | AppError::AiQuotaExceeded(message) => ApiError {
                status,
                error: message.clone(),
                details: None,
            },
            AppError::Collaborator(reason) => {
                tracing::warn!("Falha em serviço externo: {}", reason);
                ApiError {
                    status,
                    error: i18n.translate(lang, self.code()),
                    details: Some(json!({ "reason": reason })),
                }
            }
            AppError::UnsupportedMediaType(content_type) => ApiError {
                status,
                error: i18n.translate(lang, self.code()),
                details: Some(json!({ "contentType": content_type })),
            },
            AppError::NotFound(entity) => ApiError {
                status,
                error: i18n.translate(lang, self.code()),
                details: Some(json!({ "entity": entity })),
            },
            // DatabaseError, InternalServerError, FontNotFound: detalhe só no log.
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ApiError {
                    status,
                    error: i18n.translate(lang, self.code()),
                    details: None,
                }
            }
            _ => ApiError {
                status,
                error: i18n.translate(lang, self.code()),
                details: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 0, max = 100, message = "progress_range"))]
        progress: i32,
    }

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn limit_reached_carries_current_and_limit() {
        let err = AppError::PlanLimitReached {
            resource: LimitedResource::Projects,
            current: 3,
            limit: 3,
        };
        let api = err.to_api_error(&Locale("en-US".into()), &store());

        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert!(api.error.contains("3/3"));
        let details = api.details.unwrap();
        assert_eq!(details["current"], 3);
        assert_eq!(details["limit"], 3);
        assert_eq!(details["resource"], "projects");
    }

    #[test]
    fn validation_messages_are_translated_per_field() {
        let errors = Probe { progress: 140 }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale("sv".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["progress"][0], "Framsteg måste vara mellan 0 och 100.");
    }

    #[test]
    fn ai_messages_pass_through_verbatim() {
        let message = "Çok fazla istek gönderildi, lütfen biraz bekleyin.";
        let api = AppError::AiRateLimited(message.into()).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(api.error, message);
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("pool timeout"))
            .to_api_error(&Locale("tr".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.details.is_none());
        assert!(!api.error.contains("pool"));
    }
}
