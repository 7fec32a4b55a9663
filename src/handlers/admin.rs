// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{access::AccessContext, i18n::Locale},
    models::admin::{AdminStats, UpdateRolePayload, UserWithRole},
};

// As políticas de RLS liberam todas as linhas para quem tem o papel admin.

// GET /api/admin/stats
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Contagens globais", body = AdminStats),
        (status = 403, description = "Usuário não é admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    access
        .require_admin()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stats = app_state.admin_service
        .stats(&mut *tx)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Usuários com seus papéis", body = Vec<UserWithRole>),
        (status = 403, description = "Usuário não é admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    access
        .require_admin()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let users = app_state.admin_service
        .list_users(&mut *tx)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// PUT /api/admin/users/{id}/role
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    tag = "Admin",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Papel substituído"),
        (status = 403, description = "Usuário não é admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_user_role(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    access
        .require_admin()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Apagar + inserir o papel precisam ir juntos
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.admin_service
        .set_role(&mut *tx, user_id, payload.role)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("🛡️ Papel de {} alterado para {:?} por {}", user_id, payload.role, access.user.0.id);

    Ok(StatusCode::NO_CONTENT)
}
