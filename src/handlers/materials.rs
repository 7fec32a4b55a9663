// src/handlers/materials.rs

use axum::{
    extract::{Path, Query, State},
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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::material::{
        BulkMaterialsPayload, CreateMaterialPayload, Material, MaterialFilter, MaterialListResponse, MaterialPatch,
    },
};

// GET /api/materials
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materials",
    params(MaterialFilter),
    responses(
        (status = 200, description = "Materiais com totais estimado/real", body = MaterialListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<MaterialFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state.material_service
        .list(&mut *tx, user.0.id, filter.project_id, locale.currency_locale())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// POST /api/materials
#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Materials",
    request_body = CreateMaterialPayload,
    responses(
        (status = 201, description = "Material criado", body = Material),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateMaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state.material_service
        .create(&mut *tx, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(material)))
}

// POST /api/materials/bulk
#[utoipa::path(
    post,
    path = "/api/materials/bulk",
    tag = "Materials",
    request_body = BulkMaterialsPayload,
    responses(
        (status = 201, description = "Materiais criados (todos ou nenhum)", body = Vec<Material>),
        (status = 400, description = "Algum item inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_materials_bulk(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<BulkMaterialsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Se um item falhar, o drop do tx desfaz os anteriores
    let materials = app_state.material_service
        .create_bulk(&mut *tx, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(materials)))
}

// PATCH /api/materials/{id}
#[utoipa::path(
    patch,
    path = "/api/materials/{id}",
    tag = "Materials",
    request_body = MaterialPatch,
    params(("id" = Uuid, Path, description = "ID do material")),
    responses(
        (status = 200, description = "Material atualizado", body = Material),
        (status = 400, description = "Dados inválidos ou nenhum campo enviado"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(material_id): Path<Uuid>,
    Json(patch): Json<MaterialPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state.material_service
        .update(&mut *tx, user.0.id, material_id, &patch)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// DELETE /api/materials/{id}
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do material")),
    responses(
        (status = 204, description = "Material removido"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(material_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.material_service
        .delete(&mut *tx, user.0.id, material_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
