// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{access::AccessContext, i18n::Locale},
    models::report::ReportSummary,
    services::report_service::ReportContext,
};

// GET /api/reports/summary
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    responses(
        (status = 200, description = "KPIs básicos e widgets (travados sem Premium)", body = ReportSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn report_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &access.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let ctx = ReportContext {
        locale: locale.currency_locale(),
        lang: locale.lang(),
        i18n: &app_state.i18n_store,
        upgrade_price_id: &app_state.config.premium_price_id,
    };

    let report = app_state.report_service
        .summary(&mut *tx, &access.policy_without_counts(), access.user.0.id, &ctx)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit().await.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
