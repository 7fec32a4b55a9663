// src/services/subscription/hub.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::Url;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{checkout::take_checkout_marker, BillingClient, SubscriptionSync};
use crate::{
    common::error::AppError,
    models::{auth::SessionUser, subscription::CheckoutReturnResponse},
};

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub checkout_refresh_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            checkout_refresh_delay: Duration::from_secs(2),
        }
    }
}

/// Registro das sessões ativas, uma `SubscriptionSync` por usuário.
#[derive(Clone)]
pub struct SubscriptionHub {
    billing: Arc<dyn BillingClient>,
    settings: SyncSettings,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<SubscriptionSync>>>>,
}

impl SubscriptionHub {
    pub fn new(billing: Arc<dyn BillingClient>, settings: SyncSettings) -> Self {
        Self {
            billing,
            settings,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sessão do usuário, criada na primeira requisição.
    /// Nenhuma requisição sai daqui antes da primeira resposta do billing,
    /// mesmo as que chegam enquanto a consulta inicial está em voo.
    pub async fn session(&self, user: &SessionUser) -> Arc<SubscriptionSync> {
        // O lock do registro nunca atravessa chamadas de rede
        let (sync, created, expired) = {
            let mut sessions = self.sessions.lock().await;
            let expired = sweep_expired(&mut sessions);
            let (sync, created) = match sessions.get(&user.id) {
                Some(existing) if existing.is_active() => (Arc::clone(existing), false),
                _ => {
                    let sync = Arc::new(SubscriptionSync::new(
                        Arc::clone(&self.billing),
                        user.token.clone(),
                        user.expires_at,
                    ));
                    sessions.insert(user.id, Arc::clone(&sync));
                    (sync, true)
                }
            };
            (sync, created, expired)
        };

        if !expired.is_empty() {
            tracing::info!("🧹 {} sessão(ões) com token expirado removida(s)", expired.len());
            for stale in expired {
                stale.end().await;
            }
        }

        if created {
            tracing::info!("🔄 Sessão de assinatura iniciada para {}", user.id);
            sync.start().await;
        } else if sync.update_session(&user.token, user.expires_at).await {
            tracing::info!("🔄 Token trocado para {}: reconsultando a assinatura", user.id);
            sync.refresh().await;
        }
        sync.first_answer().await;
        sync.ensure_polling(self.settings.poll_interval).await;

        sync
    }

    /// Logout: para os timers e esquece a sessão.
    pub async fn end_session(&self, user_id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&user_id);
        match removed {
            Some(sync) => {
                sync.end().await;
                tracing::info!("⏹️ Sessão de assinatura encerrada para {}", user_id);
                true
            }
            None => false,
        }
    }

    /// Trata a URL de retorno do checkout: remove o marcador e agenda a reconsulta.
    pub async fn checkout_return(&self, user: &SessionUser, url: &str) -> Result<CheckoutReturnResponse, AppError> {
        let mut url = Url::parse(url).map_err(|e| anyhow::anyhow!("URL de retorno inválida: {}", e))?;
        let had_marker = take_checkout_marker(&mut url);

        if had_marker {
            let sync = self.session(user).await;
            sync.schedule_refresh(self.settings.checkout_refresh_delay).await;
        }

        Ok(CheckoutReturnResponse {
            url: url.to_string(),
            refresh_scheduled: had_marker,
        })
    }

    pub fn settings(&self) -> SyncSettings {
        self.settings
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Tira do registro as sessões encerradas ou com token vencido.
fn sweep_expired(sessions: &mut HashMap<Uuid, Arc<SubscriptionSync>>) -> Vec<Arc<SubscriptionSync>> {
    let stale: Vec<Uuid> = sessions
        .iter()
        .filter(|(_, sync)| !sync.is_active() || sync.token_expired())
        .map(|(id, _)| *id)
        .collect();

    stale.iter().filter_map(|id| sessions.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::subscription::fake::{premium, FakeBilling, PREMIUM};
    use chrono::Utc;
    use tokio::time;

    fn user(token: &str) -> SessionUser {
        SessionUser {
            id: Uuid::from_u128(7),
            email: Some("usta@example.com".to_string()),
            token: token.to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    fn expired_user(id: u128) -> SessionUser {
        SessionUser {
            id: Uuid::from_u128(id),
            email: None,
            token: format!("old-{}", id),
            expires_at: Utc::now() - chrono::Duration::minutes(5),
        }
    }

    fn hub(billing: Arc<FakeBilling>) -> SubscriptionHub {
        SubscriptionHub::new(billing, SyncSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_waits_for_the_initial_check() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::from_millis(300), Ok(premium())).await;
        let hub = hub(billing.clone());

        let sync = hub.session(&user("t1")).await;
        let state = sync.current().await;
        assert!(!state.loading);
        assert!(state.is_premium(PREMIUM));
        assert_eq!(billing.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_requests_at_login_both_see_the_first_answer() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::from_millis(300), Ok(premium())).await;
        let hub = hub(billing.clone());
        let me = user("t1");

        let (first, second) = tokio::join!(hub.session(&me), hub.session(&me));

        for sync in [first, second] {
            let state = sync.current().await;
            assert!(!state.loading);
            assert!(state.is_premium(PREMIUM));
        }
        assert_eq!(billing.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_sessions_leave_the_registry() {
        let billing = Arc::new(FakeBilling::default());
        let hub = hub(billing.clone());

        let stale = hub.session(&expired_user(1)).await;
        hub.session(&expired_user(2)).await;
        assert_eq!(hub.session_count().await, 1);
        assert!(!stale.is_active());

        hub.session(&user("t1")).await;
        assert_eq!(hub.session_count().await, 1);

        // Token válido e igual: a sessão fica
        let checks = billing.checks();
        hub.session(&user("t1")).await;
        assert_eq!(billing.checks(), checks);
    }

    #[tokio::test(start_paused = true)]
    async fn same_token_reuses_session_and_new_token_requeries() {
        let billing = Arc::new(FakeBilling::default());
        let hub = hub(billing.clone());

        hub.session(&user("t1")).await;
        hub.session(&user("t1")).await;
        assert_eq!(billing.checks(), 1);

        hub.session(&user("t2")).await;
        assert_eq!(billing.checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_stops_the_poll_timer() {
        let billing = Arc::new(FakeBilling::default());
        let hub = hub(billing.clone());
        let me = user("t1");

        hub.session(&me).await;
        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(billing.checks(), 2);

        assert!(hub.end_session(me.id).await);
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(billing.checks(), 2);
        assert!(!hub.end_session(me.id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_marker_schedules_one_refresh() {
        let billing = Arc::new(FakeBilling::default());
        let hub = hub(billing.clone());
        let me = user("t1");
        hub.session(&me).await;

        billing.push(Duration::ZERO, Ok(premium())).await;
        let response = hub
            .checkout_return(&me, "https://app.example.com/?subscription=success")
            .await
            .unwrap();
        assert!(response.refresh_scheduled);
        assert_eq!(response.url, "https://app.example.com/");

        time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(billing.checks(), 2);
        assert!(hub.session(&me).await.current().await.is_premium(PREMIUM));

        // URL já limpa: nada a fazer
        let again = hub.checkout_return(&me, &response.url).await.unwrap();
        assert!(!again.refresh_scheduled);
    }
}
