// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AdminRepository, CustomerRepository, MaterialRepository, ProjectRepository, RoleRepository, TaskRepository,
        TeamRepository,
    },
    models::subscription::{PlanLimits, PREMIUM_PRICE_ID, PREMIUM_PRODUCT_ID, STANDARD_MAX_PHOTOS_PER_PROJECT},
    services::{
        admin_service::AdminService,
        ai_service::{AiDraftingClient, HttpAiClient},
        auth::AuthService,
        contract_service::ContractService,
        customer_service::CustomerService,
        document_service::DocumentService,
        edge::EdgeClient,
        entitlement::EntitlementService,
        material_service::MaterialService,
        project_service::ProjectService,
        report_service::ReportService,
        storage::{FileStorage, HttpFileStorage},
        subscription::{BillingClient, HttpBillingClient, SubscriptionHub, SyncSettings},
        task_service::TaskService,
        team_service::TeamService,
    },
};

/// Configuração lida do ambiente (`.env` carregado pelo dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub bind_addr: String,
    // BaaS: edge functions (billing, IA) e storage
    pub backend_url: String,
    pub backend_anon_key: String,
    pub premium_product_id: String,
    pub premium_price_id: String,
    pub plan_limits: PlanLimits,
    pub sync: SyncSettings,
    pub fonts_dir: String,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválido ({:?}): {}", key, raw, e)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{} deve ser definida", key));
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let standard_max_photos = parse_or(&lookup, "STANDARD_MAX_PHOTOS", STANDARD_MAX_PHOTOS_PER_PROJECT)?;
        let defaults = SyncSettings::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_audience: or("JWT_AUDIENCE", "authenticated"),
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            backend_url: or("BACKEND_URL", "http://localhost:54321"),
            backend_anon_key: or("BACKEND_ANON_KEY", ""),
            premium_product_id: or("PREMIUM_PRODUCT_ID", PREMIUM_PRODUCT_ID),
            premium_price_id: or("PREMIUM_PRICE_ID", PREMIUM_PRICE_ID),
            plan_limits: PlanLimits::with_standard_photo_cap(standard_max_photos),
            sync: SyncSettings {
                poll_interval: Duration::from_secs(parse_or(
                    &lookup,
                    "SUBSCRIPTION_POLL_SECS",
                    defaults.poll_interval.as_secs(),
                )?),
                checkout_refresh_delay: Duration::from_secs(parse_or(
                    &lookup,
                    "CHECKOUT_REFRESH_DELAY_SECS",
                    defaults.checkout_refresh_delay.as_secs(),
                )?),
            },
            fonts_dir: or("FONTS_DIR", "./fonts"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub role_repo: RoleRepository,
    pub subscription_hub: SubscriptionHub,
    pub entitlement_service: EntitlementService,
    pub project_service: ProjectService,
    pub task_service: TaskService,
    pub team_service: TeamService,
    pub material_service: MaterialService,
    pub customer_service: CustomerService,
    pub contract_service: ContractService,
    pub report_service: ReportService,
    pub admin_service: AdminService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = Arc::new(I18nStore::load()?);

        // --- Colaboradores externos ---
        let edge = EdgeClient::new(&config.backend_url, &config.backend_anon_key)?;
        let billing: Arc<dyn BillingClient> = Arc::new(HttpBillingClient::new(edge.clone()));
        let storage: Arc<dyn FileStorage> = Arc::new(HttpFileStorage::new(edge.clone()));
        let ai: Arc<dyn AiDraftingClient> = Arc::new(HttpAiClient::new(edge));

        // --- Monta o gráfico de dependências ---
        let project_repo = ProjectRepository::new();
        let task_repo = TaskRepository::new();
        let team_repo = TeamRepository::new();
        let material_repo = MaterialRepository::new();
        let customer_repo = CustomerRepository::new();
        let role_repo = RoleRepository::new(db_pool.clone());

        let auth_service = AuthService::new(config.jwt_secret.clone(), config.jwt_audience.clone());
        let subscription_hub = SubscriptionHub::new(billing, config.sync);
        let entitlement_service = EntitlementService::new(project_repo.clone(), team_repo.clone());
        let project_service = ProjectService::new(project_repo.clone(), storage);
        let task_service = TaskService::new(task_repo.clone());
        let team_service = TeamService::new(team_repo.clone(), task_repo.clone());
        let material_service = MaterialService::new(material_repo, project_repo.clone(), Arc::clone(&ai));
        let customer_service = CustomerService::new(customer_repo.clone(), project_repo.clone());
        let contract_service = ContractService::new(
            project_repo.clone(),
            customer_repo,
            team_repo.clone(),
            ai,
            DocumentService::new(config.fonts_dir.clone()),
        );
        let report_service = ReportService::new(project_repo, task_repo, team_repo);
        let admin_service = AdminService::new(AdminRepository::new(), role_repo.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            role_repo,
            subscription_hub,
            entitlement_service,
            project_service,
            task_service,
            team_service,
            material_service,
            customer_service,
            contract_service,
            report_service,
            admin_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")])).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_audience, "authenticated");
        assert_eq!(config.plan_limits.standard.max_photos_per_project, 2);
        assert_eq!(config.sync.poll_interval, Duration::from_secs(60));
        assert_eq!(config.sync.checkout_refresh_delay, Duration::from_secs(2));
        assert_eq!(config.premium_product_id, PREMIUM_PRODUCT_ID);
        assert_eq!(config.fonts_dir, "./fonts");
    }

    #[test]
    fn photo_cap_and_intervals_are_configurable() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("STANDARD_MAX_PHOTOS", "4"),
            ("SUBSCRIPTION_POLL_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.plan_limits.standard.max_photos_per_project, 4);
        assert_eq!(config.plan_limits.premium.max_photos_per_project, 4);
        assert_eq!(config.sync.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn missing_secret_and_bad_numbers_fail_at_boot() {
        let missing = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]));
        assert!(missing.unwrap_err().to_string().contains("JWT_SECRET"));

        let bad = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("STANDARD_MAX_PHOTOS", "dois"),
        ]));
        assert!(bad.unwrap_err().to_string().contains("STANDARD_MAX_PHOTOS"));
    }
}
