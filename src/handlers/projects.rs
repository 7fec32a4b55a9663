// src/handlers/projects.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
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
    models::{
        contract::{ContractDraft, ContractPdfPayload},
        material::MaterialSuggestionsResponse,
        project::{CreateProjectPayload, Project, ProjectOverview, ProjectPatch, RemovePhotoPayload},
    },
};

// =============================================================================
//  ÁREA 1: CRUD
// =============================================================================

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Projetos com orçamento e datas formatados", body = Vec<ProjectOverview>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let projects = app_state.project_service
        .list(&mut *tx, access.user.0.id, locale.currency_locale(), access.max_photos_allowed())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(projects)))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Limite de projetos do plano atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let counts = app_state.entitlement_service
        .counts(&mut *tx, access.user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state.project_service
        .create(&mut *tx, &access.policy(counts), access.user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(project)))
}

// PATCH /api/projects/{id}
#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = ProjectPatch,
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 400, description = "Dados inválidos ou nenhum campo enviado"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state.project_service
        .update(&mut *tx, user.0.id, project_id, &patch)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// DELETE /api/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 204, description = "Projeto removido"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.project_service
        .delete(&mut *tx, user.0.id, project_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: FOTOS
// =============================================================================

// PUT /api/projects/{id}/photos
#[utoipa::path(
    put,
    path = "/api/projects/{id}/photos",
    tag = "Projects",
    request_body(content = Vec<u8>, description = "Imagem (corpo bruto)", content_type = "image/*"),
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Foto adicionada ao fim da lista", body = Project),
        (status = 403, description = "Limite de fotos do plano atingido"),
        (status = 415, description = "Tipo de arquivo não suportado"),
        (status = 502, description = "Falha no storage")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state.project_service
        .add_photo(
            &mut *tx,
            &access.policy_without_counts(),
            &access.user.0,
            project_id,
            &content_type,
            body.to_vec(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// DELETE /api/projects/{id}/photos
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/photos",
    tag = "Projects",
    request_body = RemovePhotoPayload,
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Foto removida da lista", body = Project),
        (status = 404, description = "Projeto ou foto não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<RemovePhotoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state.project_service
        .remove_photo(&mut *tx, user.0.id, project_id, &payload.url)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// =============================================================================
//  ÁREA 3: IA E CONTRATOS (Premium)
// =============================================================================

// POST /api/projects/{id}/contract
#[utoipa::path(
    post,
    path = "/api/projects/{id}/contract",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Minuta do contrato em Markdown", body = ContractDraft),
        (status = 402, description = "Créditos de IA esgotados"),
        (status = 403, description = "Recurso exclusivo do Premium"),
        (status = 429, description = "Muitas requisições ao serviço de IA")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let draft = app_state.contract_service
        .draft(&mut *tx, &access.policy_without_counts(), &access.user.0, project_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(draft)))
}

// POST /api/projects/{id}/contract/pdf
#[utoipa::path(
    post,
    path = "/api/projects/{id}/contract/pdf",
    tag = "Contracts",
    request_body = ContractPdfPayload,
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Contrato em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 403, description = "Recurso exclusivo do Premium"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn contract_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<ContractPdfPayload>,
) -> Result<Response, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pdf = app_state.contract_service
        .render_pdf(&mut *tx, &access.policy_without_counts(), access.user.0.id, project_id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar o PDF
    let disposition = format!("attachment; filename=\"{}\"", pdf.filename);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf.bytes).into_response())
}

// POST /api/projects/{id}/material-suggestions
#[utoipa::path(
    post,
    path = "/api/projects/{id}/material-suggestions",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Materiais sugeridos pela IA (não salvos)", body = MaterialSuggestionsResponse),
        (status = 402, description = "Créditos de IA esgotados"),
        (status = 403, description = "Recurso exclusivo do Premium"),
        (status = 429, description = "Muitas requisições ao serviço de IA")
    ),
    security(("api_jwt" = []))
)]
pub async fn suggest_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let suggestions = app_state.material_service
        .suggest(&mut *tx, &access.policy_without_counts(), &access.user.0, project_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(suggestions)))
}
