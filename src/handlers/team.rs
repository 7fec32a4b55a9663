// src/handlers/team.rs

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
    middleware::{access::AccessContext, auth::AuthenticatedUser, i18n::Locale},
    models::team::{CreateTeamMemberPayload, TeamMember, TeamMemberPatch, TeamMemberSummary, TeamMemberView},
};

// GET /api/team-members
#[utoipa::path(
    get,
    path = "/api/team-members",
    tag = "Team",
    responses(
        (status = 200, description = "Equipe com saldo e estimativa mensal", body = Vec<TeamMemberView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let members = app_state.team_service
        .list(&mut *tx, user.0.id, locale.currency_locale())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}

// GET /api/team-members/{id}/summary
#[utoipa::path(
    get,
    path = "/api/team-members/{id}/summary",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro e tarefas atribuídas por status", body = TeamMemberSummary),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn member_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state.team_service
        .summary(&mut *tx, user.0.id, member_id, locale.currency_locale())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/team-members
#[utoipa::path(
    post,
    path = "/api/team-members",
    tag = "Team",
    request_body = CreateTeamMemberPayload,
    responses(
        (status = 201, description = "Membro criado", body = TeamMember),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Limite de membros do plano atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Json(payload): Json<CreateTeamMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let counts = app_state.entitlement_service
        .counts(&mut *tx, access.user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state.team_service
        .create(&mut *tx, &access.policy(counts), access.user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

// PATCH /api/team-members/{id}
#[utoipa::path(
    patch,
    path = "/api/team-members/{id}",
    tag = "Team",
    request_body = TeamMemberPatch,
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro atualizado", body = TeamMember),
        (status = 400, description = "Dados inválidos ou nenhum campo enviado"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(member_id): Path<Uuid>,
    Json(patch): Json<TeamMemberPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state.team_service
        .update(&mut *tx, user.0.id, member_id, &patch)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

// DELETE /api/team-members/{id}
#[utoipa::path(
    delete,
    path = "/api/team-members/{id}",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 204, description = "Membro removido"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.team_service
        .delete(&mut *tx, user.0.id, member_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
