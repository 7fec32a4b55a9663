// src/handlers/subscription.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{access::AccessContext, auth::AuthenticatedUser, i18n::Locale},
    models::subscription::{
        CheckoutPayload, CheckoutReturnPayload, CheckoutReturnResponse, PlanInfo, RedirectResponse,
        SubscriptionResponse,
    },
    services::{
        entitlement::EntitlementSnapshot,
        subscription::plans::{plan_catalog, PlanIds},
    },
};

// =============================================================================
//  ÁREA 1: ESTADO DA ASSINATURA
// =============================================================================

// GET /api/subscription
#[utoipa::path(
    get,
    path = "/api/subscription",
    tag = "Subscription",
    responses(
        (status = 200, description = "Estado atual da assinatura (cache da sessão)", body = SubscriptionResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_subscription(access: AccessContext) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(access.subscription_response())))
}

// POST /api/subscription/refresh
#[utoipa::path(
    post,
    path = "/api/subscription/refresh",
    tag = "Subscription",
    responses(
        (status = 200, description = "Reconsulta o billing e devolve o estado novo", body = SubscriptionResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh_subscription(access: AccessContext) -> Result<impl IntoResponse, ApiError> {
    let state = access.sync.refresh().await;
    Ok((StatusCode::OK, Json(access.response_for(state))))
}

// GET /api/entitlements
#[utoipa::path(
    get,
    path = "/api/entitlements",
    tag = "Subscription",
    responses(
        (status = 200, description = "Limites e travas efetivos do usuário", body = EntitlementSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_entitlements(
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

    Ok((StatusCode::OK, Json(access.policy(counts).snapshot())))
}

// GET /api/subscription/plans
#[utoipa::path(
    get,
    path = "/api/subscription/plans",
    tag = "Subscription",
    responses(
        (status = 200, description = "Planos Standard e Premium no idioma do cliente", body = Vec<PlanInfo>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let ids = PlanIds {
        premium_product_id: &app_state.config.premium_product_id,
        premium_price_id: &app_state.config.premium_price_id,
    };
    let plans = plan_catalog(&app_state.config.plan_limits, &ids, &app_state.i18n_store, locale.lang());

    Ok((StatusCode::OK, Json(plans)))
}

// =============================================================================
//  ÁREA 2: CHECKOUT E PORTAL
// =============================================================================

// POST /api/subscription/checkout
#[utoipa::path(
    post,
    path = "/api/subscription/checkout",
    tag = "Subscription",
    request_body = CheckoutPayload,
    responses(
        (status = 200, description = "URL da sessão de checkout", body = RedirectResponse),
        (status = 502, description = "Billing não devolveu URL")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_checkout(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
    payload: Option<Json<CheckoutPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let price_id = payload
        .price_id
        .unwrap_or_else(|| app_state.config.premium_price_id.clone());

    let url = access.sync
        .create_checkout(&price_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(RedirectResponse { url })))
}

// POST /api/subscription/portal
#[utoipa::path(
    post,
    path = "/api/subscription/portal",
    tag = "Subscription",
    responses(
        (status = 200, description = "URL do portal do cliente", body = RedirectResponse),
        (status = 502, description = "Billing não devolveu URL")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_portal(
    State(app_state): State<AppState>,
    locale: Locale,
    access: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let url = access.sync
        .open_customer_portal()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(RedirectResponse { url })))
}

// POST /api/subscription/checkout-return
#[utoipa::path(
    post,
    path = "/api/subscription/checkout-return",
    tag = "Subscription",
    request_body = CheckoutReturnPayload,
    responses(
        (status = 200, description = "URL limpa e se a reconsulta foi agendada", body = CheckoutReturnResponse),
        (status = 400, description = "URL inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn checkout_return(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CheckoutReturnPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state.subscription_hub
        .checkout_return(&user.0, &payload.url)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}
