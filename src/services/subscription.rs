// src/services/subscription.rs
//
// Sincronização do status da assinatura por sessão.
// Estados: Unknown (carregando) -> Known -> Error (mantém o último Known).
// Consultas são numeradas; uma resposta antiga nunca sobrescreve uma mais nova.

pub mod billing;
pub mod checkout;
pub mod hub;
pub mod plans;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{watch, Mutex, RwLock},
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{common::error::AppError, models::subscription::{BillingStatus, SubscriptionState}};

pub use billing::{BillingClient, BillingError, HttpBillingClient};
pub use hub::{SubscriptionHub, SyncSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Unknown,
    Known,
    Error(String),
}

/// Estado puro da sincronização. As transições não fazem I/O.
#[derive(Debug, Clone)]
pub struct SyncState {
    phase: SyncPhase,
    last_known: Option<BillingStatus>,
    applied_seq: u64,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Unknown,
            last_known: None,
            applied_seq: 0,
        }
    }
}

impl SyncState {
    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    /// Aplica uma resposta do billing. Ignorada se `seq` não for mais nova que a última aplicada.
    pub fn apply_success(&mut self, seq: u64, status: BillingStatus) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.phase = SyncPhase::Known;
        self.last_known = Some(status);
        true
    }

    /// Falha de consulta: guarda a mensagem, mas não rebaixa o último status conhecido.
    pub fn apply_failure(&mut self, seq: u64, message: String) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.phase = SyncPhase::Error(message);
        true
    }

    pub fn view(&self) -> SubscriptionState {
        let known = self.last_known.clone().unwrap_or_default();
        let (loading, error) = match &self.phase {
            SyncPhase::Unknown => (true, None),
            SyncPhase::Known => (false, None),
            SyncPhase::Error(message) => (false, Some(message.clone())),
        };

        SubscriptionState {
            subscribed: known.subscribed,
            product_id: known.product_id,
            price_id: known.price_id,
            subscription_end: known.subscription_end,
            loading,
            error,
        }
    }
}

struct SyncInner {
    billing: Arc<dyn BillingClient>,
    token: RwLock<String>,
    expires_at: AtomicI64,
    state: RwLock<SyncState>,
    issued: AtomicU64,
    active: AtomicBool,
    polling: AtomicBool,
    // Vira `true` na primeira resposta aplicada (ou no fim da sessão)
    answered: watch::Sender<bool>,
}

impl SyncInner {
    async fn refresh(&self) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.token.read().await.clone();

        let result = self.billing.check_status(&token).await;

        // Sessão encerrada enquanto a consulta estava em voo
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(status) => {
                if !state.apply_success(seq, status) {
                    tracing::debug!("Resposta de billing #{} descartada (obsoleta)", seq);
                }
            }
            Err(e) => {
                tracing::warn!("Falha ao consultar a assinatura: {}", e);
                state.apply_failure(seq, e.to_string());
            }
        }
        drop(state);
        self.answered.send_replace(true);
    }

    fn token_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at.load(Ordering::SeqCst)
    }
}

/// Sincronizador de uma sessão autenticada. Dono dos timers da sessão:
/// `end()` (ou o drop) cancela tudo que estiver agendado.
pub struct SubscriptionSync {
    inner: Arc<SyncInner>,
    tasks: Mutex<JoinSet<()>>,
}

impl SubscriptionSync {
    pub fn new(billing: Arc<dyn BillingClient>, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                billing,
                token: RwLock::new(token),
                expires_at: AtomicI64::new(expires_at.timestamp()),
                state: RwLock::new(SyncState::default()),
                issued: AtomicU64::new(0),
                active: AtomicBool::new(true),
                polling: AtomicBool::new(false),
                answered: watch::channel(false).0,
            }),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub async fn current(&self) -> SubscriptionState {
        self.inner.state.read().await.view()
    }

    /// Consulta imediata (início de sessão, refresh manual).
    pub async fn refresh(&self) -> SubscriptionState {
        self.inner.refresh().await;
        self.current().await
    }

    /// Primeira consulta da sessão, em segundo plano.
    /// Não depende de quem a pediu continuar esperando.
    pub async fn start(&self) {
        let inner = Arc::clone(&self.inner);
        self.spawn(async move { inner.refresh().await }).await;
    }

    /// Espera a primeira resposta do billing (sucesso ou erro).
    /// Retorna na hora se já houve resposta ou se a sessão terminou.
    pub async fn first_answer(&self) {
        let mut answered = self.inner.answered.subscribe();
        // O sender vive em `inner`, que seguramos aqui
        let _ = answered.wait_for(|done| *done).await;
    }

    pub fn token_expired(&self) -> bool {
        self.inner.token_expired()
    }

    /// Atualiza o token da sessão. `true` se mudou (troca de identidade).
    pub async fn update_session(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        self.inner.expires_at.store(expires_at.timestamp(), Ordering::SeqCst);
        let mut current = self.inner.token.write().await;
        if *current == token {
            return false;
        }
        *current = token.to_string();
        true
    }

    /// Liga a consulta periódica, se ainda não estiver ligada.
    /// O laço para sozinho quando o token expira ou a sessão termina.
    pub async fn ensure_polling(&self, every: Duration) {
        if self.inner.polling.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !inner.active.load(Ordering::SeqCst) {
                    break;
                }
                if inner.token_expired() {
                    tracing::info!("Token expirado: consulta periódica da assinatura encerrada");
                    break;
                }
                inner.refresh().await;
            }
            inner.polling.store(false, Ordering::SeqCst);
        })
        .await;
    }

    /// Agenda uma consulta depois de `delay` (retorno do checkout).
    pub async fn schedule_refresh(&self, delay: Duration) {
        let inner = Arc::clone(&self.inner);
        self.spawn(async move {
            time::sleep(delay).await;
            inner.refresh().await;
        })
        .await;
    }

    async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        // Recolhe as tarefas que já terminaram
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    #[cfg(test)]
    pub(crate) async fn pending_tasks(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn create_checkout(&self, price_id: &str) -> Result<String, AppError> {
        let token = self.inner.token.read().await.clone();
        match self.inner.billing.create_checkout_session(&token, price_id).await {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(AppError::CheckoutUnavailable),
            Err(e) => {
                tracing::warn!("Falha ao criar o checkout: {}", e);
                Err(AppError::CheckoutUnavailable)
            }
        }
    }

    pub async fn open_customer_portal(&self) -> Result<String, AppError> {
        let token = self.inner.token.read().await.clone();
        match self.inner.billing.open_portal(&token).await {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(AppError::PortalUnavailable),
            Err(e) => {
                tracing::warn!("Falha ao abrir o portal do cliente: {}", e);
                Err(AppError::PortalUnavailable)
            }
        }
    }

    /// Encerra a sessão: para o polling e cancela consultas agendadas.
    pub async fn end(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
        self.tasks.lock().await.abort_all();
        self.inner.answered.send_replace(true);
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::VecDeque,
        sync::atomic::{AtomicU64, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::{BillingClient, BillingError};
    use crate::models::subscription::BillingStatus;

    pub const PREMIUM: &str = "prod_TiJnuqsH5SgpBF";

    pub fn premium() -> BillingStatus {
        BillingStatus {
            subscribed: true,
            product_id: Some(PREMIUM.to_string()),
            price_id: Some("price_1Skt9sBqz5IswCfZjnSobzU9".to_string()),
            subscription_end: None,
        }
    }

    /// Billing de teste: respostas enfileiradas, com atraso opcional por resposta.
    /// Fila vazia = "não assinante".
    #[derive(Default)]
    pub struct FakeBilling {
        pub responses: Mutex<VecDeque<(Duration, Result<BillingStatus, String>)>>,
        pub checks: AtomicU64,
        pub checkout_url: Option<String>,
    }

    impl FakeBilling {
        pub async fn push(&self, delay: Duration, response: Result<BillingStatus, String>) {
            self.responses.lock().await.push_back((delay, response));
        }

        pub fn checks(&self) -> u64 {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BillingClient for FakeBilling {
        async fn check_status(&self, _token: &str) -> Result<BillingStatus, BillingError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().await.pop_front();
            let (delay, response) = next.unwrap_or((Duration::ZERO, Ok(BillingStatus::default())));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            response.map_err(|message| BillingError::Rejected { status: 500, message })
        }

        async fn create_checkout_session(&self, _token: &str, _price_id: &str) -> Result<Option<String>, BillingError> {
            Ok(self.checkout_url.clone())
        }

        async fn open_portal(&self, _token: &str) -> Result<Option<String>, BillingError> {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{premium, FakeBilling, PREMIUM};
    use super::*;

    fn far_future() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::days(1)
    }

    fn sync_with(billing: Arc<FakeBilling>) -> SubscriptionSync {
        SubscriptionSync::new(billing, "token-a".to_string(), far_future())
    }

    #[test]
    fn unknown_state_is_loading_and_not_premium() {
        let view = SyncState::default().view();
        assert!(view.loading);
        assert!(!view.is_premium(PREMIUM));
    }

    #[test]
    fn error_keeps_last_known_values() {
        let mut state = SyncState::default();
        assert!(state.apply_success(1, premium()));
        assert!(state.apply_failure(2, "timeout".to_string()));

        let view = state.view();
        assert!(view.is_premium(PREMIUM));
        assert_eq!(view.error.as_deref(), Some("timeout"));
        assert!(!view.loading);
    }

    #[test]
    fn error_without_known_status_is_not_subscribed() {
        let mut state = SyncState::default();
        state.apply_failure(1, "offline".to_string());
        assert!(!state.view().subscribed);
        assert_eq!(state.phase(), &SyncPhase::Error("offline".to_string()));
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut state = SyncState::default();
        assert!(state.apply_success(2, BillingStatus::default()));
        assert!(!state.apply_success(1, premium()));
        assert!(!state.view().subscribed);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_sixty_seconds_and_stops_on_end() {
        let billing = Arc::new(FakeBilling::default());
        let sync = sync_with(billing.clone());

        sync.ensure_polling(Duration::from_secs(60)).await;
        time::sleep(Duration::from_secs(59)).await;
        assert_eq!(billing.checks(), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(billing.checks(), 1);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(billing.checks(), 2);

        sync.end().await;
        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(billing.checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_does_not_downgrade() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::ZERO, Ok(premium())).await;
        billing.push(Duration::ZERO, Err("gateway timeout".to_string())).await;
        let sync = sync_with(billing.clone());

        assert!(sync.refresh().await.is_premium(PREMIUM));

        let after_error = sync.refresh().await;
        assert!(after_error.is_premium(PREMIUM));
        assert_eq!(after_error.error.as_deref(), Some("Billing respondeu 500: gateway timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_response_does_not_overwrite_newer_one() {
        let billing = Arc::new(FakeBilling::default());
        // 1ª consulta: lenta e "assinante"; 2ª: rápida e "não assinante"
        billing.push(Duration::from_secs(5), Ok(premium())).await;
        billing.push(Duration::ZERO, Ok(BillingStatus::default())).await;
        let sync = Arc::new(sync_with(billing.clone()));

        let slow = {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.refresh().await })
        };
        tokio::task::yield_now().await;
        let fresh = sync.refresh().await;
        assert!(!fresh.subscribed);

        slow.await.unwrap();
        assert!(!sync.current().await.subscribed);
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_return_refresh_fires_after_delay() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::ZERO, Ok(premium())).await;
        let sync = sync_with(billing.clone());

        sync.schedule_refresh(Duration::from_secs(2)).await;
        time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(billing.checks(), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(billing.checks(), 1);
        assert!(sync.current().await.is_premium(PREMIUM));
    }

    #[tokio::test(start_paused = true)]
    async fn ending_cancels_scheduled_refresh() {
        let billing = Arc::new(FakeBilling::default());
        let sync = sync_with(billing.clone());

        sync.schedule_refresh(Duration::from_secs(2)).await;
        sync.end().await;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(billing.checks(), 0);
        assert!(!sync.is_active());
    }

    #[tokio::test]
    async fn missing_checkout_url_is_a_user_visible_error() {
        let sync = sync_with(Arc::new(FakeBilling::default()));

        assert!(matches!(sync.create_checkout("price_x").await, Err(AppError::CheckoutUnavailable)));
        assert!(matches!(sync.open_customer_portal().await, Err(AppError::PortalUnavailable)));
    }

    #[tokio::test(start_paused = true)]
    async fn first_answer_waits_for_the_background_check() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::from_millis(300), Ok(premium())).await;
        let sync = sync_with(billing.clone());

        sync.start().await;
        assert!(sync.current().await.loading);

        sync.first_answer().await;
        let state = sync.current().await;
        assert!(!state.loading);
        assert!(state.is_premium(PREMIUM));
    }

    #[tokio::test(start_paused = true)]
    async fn first_answer_also_opens_on_error_and_on_end() {
        let billing = Arc::new(FakeBilling::default());
        billing.push(Duration::ZERO, Err("offline".to_string())).await;
        let failed = sync_with(billing.clone());
        failed.start().await;
        failed.first_answer().await;
        assert!(!failed.current().await.loading);

        let ended = sync_with(Arc::new(FakeBilling::default()));
        ended.end().await;
        ended.first_answer().await;
        assert!(!ended.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_refreshes_are_reaped() {
        let billing = Arc::new(FakeBilling::default());
        let sync = sync_with(billing.clone());

        for _ in 0..5 {
            sync.schedule_refresh(Duration::from_secs(2)).await;
        }
        assert_eq!(sync.pending_tasks().await, 5);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(billing.checks(), 5);

        sync.schedule_refresh(Duration::from_secs(2)).await;
        assert_eq!(sync.pending_tasks().await, 1);
    }

    #[test]
    fn past_expiry_marks_the_token_expired() {
        let billing: Arc<FakeBilling> = Arc::new(FakeBilling::default());
        let expired = SubscriptionSync::new(billing.clone(), "t".to_string(), Utc::now() - chrono::Duration::minutes(1));
        assert!(expired.token_expired());
        assert!(!sync_with(billing).token_expired());
    }

    #[tokio::test]
    async fn token_change_is_reported_once() {
        let sync = sync_with(Arc::new(FakeBilling::default()));

        assert!(!sync.update_session("token-a", far_future()).await);
        assert!(sync.update_session("token-b", far_future()).await);
        assert!(!sync.update_session("token-b", far_future()).await);
    }
}
