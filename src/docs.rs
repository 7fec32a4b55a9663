// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::get_me,
        handlers::auth::end_session,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::upload_photo,
        handlers::projects::remove_photo,

        // --- Contracts ---
        handlers::projects::generate_contract,
        handlers::projects::contract_pdf,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,

        // --- Team ---
        handlers::team::list_members,
        handlers::team::member_summary,
        handlers::team::create_member,
        handlers::team::update_member,
        handlers::team::delete_member,

        // --- Materials ---
        handlers::materials::list_materials,
        handlers::materials::create_material,
        handlers::materials::create_materials_bulk,
        handlers::materials::update_material,
        handlers::materials::delete_material,
        handlers::projects::suggest_materials,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Subscription ---
        handlers::subscription::get_subscription,
        handlers::subscription::refresh_subscription,
        handlers::subscription::get_entitlements,
        handlers::subscription::list_plans,
        handlers::subscription::create_checkout,
        handlers::subscription::open_portal,
        handlers::subscription::checkout_return,

        // --- Reports ---
        handlers::reports::report_summary,

        // --- Admin ---
        handlers::admin::admin_stats,
        handlers::admin::list_users,
        handlers::admin::set_user_role,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::AppRole,
            models::auth::MeResponse,

            // --- Projects ---
            models::project::ProjectStatus,
            models::project::Project,
            models::project::UtilizationView,
            models::project::ProjectOverview,
            models::project::CreateProjectPayload,
            models::project::ProjectPatch,
            models::project::RemovePhotoPayload,

            // --- Contracts ---
            models::contract::ContractDraft,
            models::contract::ContractPdfPayload,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::TaskPriority,
            models::task::Task,
            models::task::CreateTaskPayload,
            models::task::TaskPatch,

            // --- Team ---
            models::team::TeamMember,
            models::team::TeamMemberView,
            models::team::MemberTaskRollup,
            models::team::TeamMemberSummary,
            models::team::CreateTeamMemberPayload,
            models::team::TeamMemberPatch,

            // --- Materials ---
            models::material::MaterialStatus,
            models::material::Material,
            models::material::MaterialTotals,
            models::material::MaterialListResponse,
            models::material::CreateMaterialPayload,
            models::material::BulkMaterialsPayload,
            models::material::MaterialPatch,
            models::material::SuggestedMaterial,
            models::material::MaterialSuggestionsResponse,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerView,
            models::customer::CreateCustomerPayload,
            models::customer::CustomerPatch,

            // --- Subscription ---
            models::subscription::SubscriptionTier,
            models::subscription::TierLimits,
            models::subscription::LimitedResource,
            models::subscription::Feature,
            models::subscription::SubscriptionState,
            models::subscription::SubscriptionResponse,
            models::subscription::CheckoutPayload,
            models::subscription::RedirectResponse,
            models::subscription::CheckoutReturnPayload,
            models::subscription::CheckoutReturnResponse,
            models::subscription::PlanInfo,
            services::entitlement::EntitlementSnapshot,

            // --- Reports ---
            models::report::AccessBadge,
            models::report::BasicKpis,
            models::report::FinancialSummary,
            models::report::TaskStatusBreakdown,
            models::report::ProjectStatusBreakdown,
            models::report::ProjectFinanceRow,
            models::report::TeamPerformanceRow,
            models::report::WidgetData,
            models::report::ReportWidget,
            models::report::ReportSummary,

            // --- Admin ---
            models::admin::AdminStats,
            models::admin::UserWithRole,
            models::admin::UpdateRolePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão e dados do usuário"),
        (name = "Projects", description = "Obras, orçamento e fotos"),
        (name = "Contracts", description = "Minuta de contrato por IA e PDF"),
        (name = "Tasks", description = "Tarefas das obras"),
        (name = "Team", description = "Equipe e pagamentos"),
        (name = "Materials", description = "Materiais por obra e sugestões da IA"),
        (name = "Customers", description = "Clientes e saldo a receber"),
        (name = "Subscription", description = "Assinatura Premium, checkout e limites do plano"),
        (name = "Reports", description = "Indicadores e widgets de relatório"),
        (name = "Admin", description = "Painel administrativo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
