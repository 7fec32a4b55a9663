// src/middleware/access.rs

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::AppRole,
        subscription::{PlanLimits, SubscriptionResponse, SubscriptionState},
    },
    services::{
        entitlement::{EntitlementPolicy, ResourceCounts},
        subscription::SubscriptionSync,
    },
};

/// Entradas da política de planos para esta requisição:
/// quem é o usuário, se é admin e o que o billing sabe da assinatura.
pub struct AccessContext {
    pub user: AuthenticatedUser,
    pub is_admin: bool,
    pub subscription: SubscriptionState,
    pub sync: Arc<SubscriptionSync>,
    premium_product_id: String,
    limits: PlanLimits,
}

impl AccessContext {
    pub fn new(
        user: AuthenticatedUser,
        is_admin: bool,
        sync: Arc<SubscriptionSync>,
        subscription: SubscriptionState,
        premium_product_id: String,
        limits: PlanLimits,
    ) -> Self {
        Self { user, is_admin, subscription, sync, premium_product_id, limits }
    }

    /// Assinante do produto Premium. Estado carregando ou com erro conta como `false`.
    pub fn is_premium_subscriber(&self) -> bool {
        self.subscription.is_premium(&self.premium_product_id)
    }

    pub fn policy(&self, counts: ResourceCounts) -> EntitlementPolicy {
        EntitlementPolicy::new(self.is_premium_subscriber(), self.is_admin, counts, self.limits)
    }

    /// Para checagens que não dependem das contagens (fotos, funcionalidades).
    pub fn policy_without_counts(&self) -> EntitlementPolicy {
        self.policy(ResourceCounts::default())
    }

    pub fn max_photos_allowed(&self) -> u32 {
        self.policy_without_counts().max_photos_allowed()
    }

    pub fn subscription_response(&self) -> SubscriptionResponse {
        self.response_for(self.subscription.clone())
    }

    /// Resposta para um estado mais novo que o da extração (ex.: depois de um refresh).
    pub fn response_for(&self, state: SubscriptionState) -> SubscriptionResponse {
        SubscriptionResponse {
            is_premium: state.is_premium(&self.premium_product_id),
            state,
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::AdminRequired)
        }
    }
}

impl FromRequestParts<AppState> for AccessContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // Falha no store de papéis: segue como usuário comum
        let is_admin = match state.role_repo.has_role(user.0.id, AppRole::Admin).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                tracing::warn!("Falha ao consultar o papel de {}: {}", user.0.id, e);
                false
            }
        };

        let sync = state.subscription_hub.session(&user.0).await;
        let subscription = sync.current().await;

        Ok(AccessContext::new(
            user,
            is_admin,
            sync,
            subscription,
            state.config.premium_product_id.clone(),
            state.config.plan_limits,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{auth::SessionUser, subscription::PREMIUM_PRODUCT_ID},
        services::subscription::fake::FakeBilling,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn context(subscription: SubscriptionState, is_admin: bool) -> AccessContext {
        let user = SessionUser {
            id: Uuid::new_v4(),
            email: None,
            token: "t".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        let sync = Arc::new(SubscriptionSync::new(
            Arc::new(FakeBilling::default()),
            user.token.clone(),
            user.expires_at,
        ));
        AccessContext::new(
            AuthenticatedUser(user),
            is_admin,
            sync,
            subscription,
            PREMIUM_PRODUCT_ID.to_string(),
            PlanLimits::default(),
        )
    }

    #[test]
    fn other_products_do_not_count_as_premium() {
        let subscription = SubscriptionState {
            subscribed: true,
            product_id: Some("prod_outro".to_string()),
            ..Default::default()
        };
        let ctx = context(subscription, false);

        assert!(!ctx.is_premium_subscriber());
        assert!(!ctx.subscription_response().is_premium);
        assert_eq!(ctx.max_photos_allowed(), 2);
        assert!(matches!(ctx.require_admin(), Err(AppError::AdminRequired)));
    }

    #[test]
    fn loading_admin_still_has_premium_access() {
        let subscription = SubscriptionState {
            loading: true,
            ..Default::default()
        };
        let ctx = context(subscription, true);

        assert!(!ctx.is_premium_subscriber());
        assert!(ctx.policy(ResourceCounts { projects: 9, team_members: 9 }).can_create_project());
        assert_eq!(ctx.max_photos_allowed(), 4);
        assert!(ctx.require_admin().is_ok());
    }
}
