// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{access::AccessContext, auth::AuthenticatedUser, i18n::Locale},
    models::auth::MeResponse,
};

// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão, assinatura e limites", body = MeResponse),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let counts = app_state.entitlement_service
        .counts(&mut *tx, access.user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let me = MeResponse {
        id: access.user.0.id,
        email: access.user.0.email.clone(),
        is_admin: access.is_admin,
        subscription: access.subscription_response(),
        entitlements: access.policy(counts).snapshot(),
    };

    Ok((StatusCode::OK, Json(me)))
}

// DELETE /api/session
// Logout: para o polling e descarta o cache da assinatura desta sessão.
#[utoipa::path(
    delete,
    path = "/api/session",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão de assinatura encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn end_session(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state.subscription_hub.end_session(user.0.id).await;
    Ok(StatusCode::NO_CONTENT)
}
