//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Limite do corpo no upload de fotos
const MAX_PHOTO_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let project_routes = Router::new()
        .route("/",
               get(handlers::projects::list_projects)
               .post(handlers::projects::create_project)
        )
        .route("/{id}",
               patch(handlers::projects::update_project)
               .delete(handlers::projects::delete_project)
        )
        .route("/{id}/photos",
               put(handlers::projects::upload_photo)
               .delete(handlers::projects::remove_photo)
               .layer(DefaultBodyLimit::max(MAX_PHOTO_UPLOAD_BYTES))
        )
        .route("/{id}/contract", post(handlers::projects::generate_contract))
        .route("/{id}/contract/pdf", post(handlers::projects::contract_pdf))
        .route("/{id}/material-suggestions", post(handlers::projects::suggest_materials));

    let task_routes = Router::new()
        .route("/",
               get(handlers::tasks::list_tasks)
               .post(handlers::tasks::create_task)
        )
        .route("/{id}",
               patch(handlers::tasks::update_task)
               .delete(handlers::tasks::delete_task)
        );

    let team_routes = Router::new()
        .route("/",
               get(handlers::team::list_members)
               .post(handlers::team::create_member)
        )
        .route("/{id}",
               patch(handlers::team::update_member)
               .delete(handlers::team::delete_member)
        )
        .route("/{id}/summary", get(handlers::team::member_summary));

    let material_routes = Router::new()
        .route("/",
               get(handlers::materials::list_materials)
               .post(handlers::materials::create_material)
        )
        .route("/bulk", post(handlers::materials::create_materials_bulk))
        .route("/{id}",
               patch(handlers::materials::update_material)
               .delete(handlers::materials::delete_material)
        );

    let customer_routes = Router::new()
        .route("/",
               get(handlers::customers::list_customers)
               .post(handlers::customers::create_customer)
        )
        .route("/{id}",
               patch(handlers::customers::update_customer)
               .delete(handlers::customers::delete_customer)
        );

    let subscription_routes = Router::new()
        .route("/", get(handlers::subscription::get_subscription))
        .route("/refresh", post(handlers::subscription::refresh_subscription))
        .route("/plans", get(handlers::subscription::list_plans))
        .route("/checkout", post(handlers::subscription::create_checkout))
        .route("/portal", post(handlers::subscription::open_portal))
        .route("/checkout-return", post(handlers::subscription::checkout_return));

    let admin_routes = Router::new()
        .route("/stats", get(handlers::admin::admin_stats))
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/role", put(handlers::admin::set_user_role));

    // Tudo abaixo de /api exige o JWT
    let api_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/session", delete(handlers::auth::end_session))
        .route("/entitlements", get(handlers::subscription::get_entitlements))
        .route("/reports/summary", get(handlers::reports::report_summary))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/team-members", team_routes)
        .nest("/materials", material_routes)
        .nest("/customers", customer_routes)
        .nest("/subscription", subscription_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.config.bind_addr.clone();

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", bind_addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
