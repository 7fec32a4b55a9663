// src/services/report_service.rs
//
// Relatório do dashboard. Os indicadores básicos saem para todos os planos;
// os widgets avançados saem bloqueados (só título e descrição) sem acesso Premium.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{
        currency::{format_currency_in, CurrencyLocale},
        error::AppError,
        i18n::I18nStore,
    },
    db::{ProjectRepository, TaskRepository, TeamRepository},
    models::{
        project::{Project, ProjectStatus},
        report::{AccessBadge, BasicKpis, FinancialSummary, ReportSummary, ReportWidget, WidgetData},
        subscription::Feature,
        task::{Task, TaskStatus},
        team::TeamMember,
    },
    services::{entitlement::EntitlementPolicy, finance_service},
};

/// Idioma e preço de upgrade para montar o relatório.
pub struct ReportContext<'a> {
    pub locale: CurrencyLocale,
    pub lang: &'a str,
    pub i18n: &'a I18nStore,
    pub upgrade_price_id: &'a str,
}

pub fn access_badge(policy: &EntitlementPolicy) -> Option<AccessBadge> {
    if policy.is_admin() {
        Some(AccessBadge::Admin)
    } else if policy.is_subscribed() {
        Some(AccessBadge::Premium)
    } else {
        None
    }
}

pub fn basic_kpis(projects: &[Project], tasks: &[Task], locale: CurrencyLocale) -> BasicKpis {
    let total_budget = finance_service::total_budget(projects);

    BasicKpis {
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| p.status == ProjectStatus::Active).count(),
        completed_projects: projects.iter().filter(|p| p.status == ProjectStatus::Completed).count(),
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Completed).count(),
        task_completion_rate: finance_service::task_completion_rate(tasks),
        formatted_total_budget: format_currency_in(total_budget, locale),
        total_budget,
    }
}

pub fn financial_summary(projects: &[Project], locale: CurrencyLocale) -> FinancialSummary {
    let total_revenue = finance_service::total_revenue(projects);
    let total_actual_cost = finance_service::total_actual_cost(projects);
    let net_profit = finance_service::net_profit(projects);
    let utilization = finance_service::budget_utilization(
        Some(finance_service::total_budget(projects)),
        Some(total_actual_cost),
    );

    FinancialSummary {
        profit_margin: finance_service::profit_margin_percent(projects),
        profit_margin_bar: finance_service::profit_margin_bar(projects),
        budget_utilization: finance_service::utilization_view(utilization),
        formatted_revenue: format_currency_in(total_revenue, locale),
        formatted_actual_cost: format_currency_in(total_actual_cost, locale),
        formatted_net_profit: format_currency_in(net_profit, locale),
        total_revenue,
        total_actual_cost,
        net_profit,
    }
}

// (chave na resposta, prefixo no catálogo)
const WIDGETS: [(&str, &str); 5] = [
    ("financialSummary", "report.financial_summary"),
    ("taskStatus", "report.task_status"),
    ("projectStatus", "report.project_status"),
    ("projectFinance", "report.project_finance"),
    ("teamPerformance", "report.team_performance"),
];

pub fn build_report(
    policy: &EntitlementPolicy,
    projects: &[Project],
    tasks: &[Task],
    members: &[TeamMember],
    ctx: &ReportContext<'_>,
) -> ReportSummary {
    let locked = policy.is_report_section_locked();

    let widgets = WIDGETS
        .iter()
        .map(|(key, catalog_key)| {
            let data = if locked {
                None
            } else {
                Some(match *key {
                    "financialSummary" => WidgetData::FinancialSummary(financial_summary(projects, ctx.locale)),
                    "taskStatus" => WidgetData::TaskStatus(finance_service::task_status_breakdown(tasks)),
                    "projectStatus" => WidgetData::ProjectStatus(finance_service::project_status_breakdown(projects)),
                    "projectFinance" => WidgetData::ProjectFinance(finance_service::project_finance_rows(projects)),
                    _ => WidgetData::TeamPerformance(finance_service::team_performance(members, tasks)),
                })
            };

            ReportWidget {
                key: key.to_string(),
                title: ctx.i18n.translate(ctx.lang, &format!("{}.title", catalog_key)),
                description: ctx.i18n.translate(ctx.lang, &format!("{}.description", catalog_key)),
                locked,
                feature: Feature::AdvancedReports,
                data,
                upgrade_price_id: locked.then(|| ctx.upgrade_price_id.to_string()),
            }
        })
        .collect();

    ReportSummary {
        badge: access_badge(policy),
        basic: basic_kpis(projects, tasks, ctx.locale),
        widgets,
    }
}

#[derive(Clone)]
pub struct ReportService {
    project_repo: ProjectRepository,
    task_repo: TaskRepository,
    team_repo: TeamRepository,
}

impl ReportService {
    pub fn new(project_repo: ProjectRepository, task_repo: TaskRepository, team_repo: TeamRepository) -> Self {
        Self { project_repo, task_repo, team_repo }
    }

    pub async fn summary(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user_id: Uuid,
        ctx: &ReportContext<'_>,
    ) -> Result<ReportSummary, AppError> {
        let projects = self.project_repo.list(&mut *conn, user_id).await?;
        let tasks = self.task_repo.list(&mut *conn, user_id, None).await?;
        // Sem acesso Premium a equipe não aparece em nenhum widget
        let members = if policy.is_report_section_locked() {
            Vec::new()
        } else {
            self.team_repo.list(&mut *conn, user_id).await?
        };

        Ok(build_report(policy, &projects, &tasks, &members, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::subscription::PlanLimits,
        services::{entitlement::ResourceCounts, finance_service::fixtures},
    };
    use rust_decimal::Decimal;

    fn policy(subscribed: bool, is_admin: bool) -> EntitlementPolicy {
        EntitlementPolicy::new(subscribed, is_admin, ResourceCounts::default(), PlanLimits::default())
    }

    fn portfolio() -> (Vec<Project>, Vec<Task>, Vec<TeamMember>) {
        let ahmet = fixtures::member("Ahmet Yılmaz Usta");
        let mut done = fixtures::project("Villa Renovation Bodrum", 500_000, 325_000, 600_000);
        done.status = ProjectStatus::Completed;
        let active = fixtures::project("Ofis", 100_000, 75_000, 0);
        let tasks = vec![
            fixtures::task(TaskStatus::Completed, Some(ahmet.id)),
            fixtures::task(TaskStatus::InProgress, Some(ahmet.id)),
            fixtures::task(TaskStatus::Pending, None),
        ];
        (vec![done, active], tasks, vec![ahmet])
    }

    fn render(policy: &EntitlementPolicy, lang: &str) -> ReportSummary {
        let (projects, tasks, members) = portfolio();
        let i18n = I18nStore::load().unwrap();
        let ctx = ReportContext {
            locale: CurrencyLocale::Turkish,
            lang,
            i18n: &i18n,
            upgrade_price_id: "price_premium",
        };
        build_report(policy, &projects, &tasks, &members, &ctx)
    }

    #[test]
    fn basic_kpis_are_always_present() {
        let report = render(&policy(false, false), "tr");

        assert_eq!(report.badge, None);
        assert_eq!(report.basic.total_projects, 2);
        assert_eq!(report.basic.completed_projects, 1);
        assert_eq!(report.basic.active_projects, 1);
        assert_eq!(report.basic.task_completion_rate, 33);
        assert_eq!(report.basic.formatted_total_budget, "₺600.000");
    }

    #[test]
    fn standard_plan_gets_locked_placeholders() {
        let report = render(&policy(false, false), "en");

        assert_eq!(report.widgets.len(), 5);
        for widget in &report.widgets {
            assert!(widget.locked);
            assert!(widget.data.is_none());
            assert_eq!(widget.upgrade_price_id.as_deref(), Some("price_premium"));
        }
        assert_eq!(report.widgets[0].title, "Financial Summary");
    }

    #[test]
    fn admin_sees_every_widget_with_data() {
        let report = render(&policy(false, true), "tr");

        assert_eq!(report.badge, Some(AccessBadge::Admin));
        assert!(report.widgets.iter().all(|w| !w.locked && w.data.is_some() && w.upgrade_price_id.is_none()));

        match &report.widgets[0].data {
            Some(WidgetData::FinancialSummary(summary)) => {
                assert_eq!(summary.net_profit, Decimal::from(200_000));
                assert_eq!(summary.formatted_net_profit, "₺200.000");
                assert_eq!(summary.budget_utilization.label, "67%");
            }
            other => panic!("esperava o resumo financeiro, veio {:?}", other),
        }
        match &report.widgets[4].data {
            Some(WidgetData::TeamPerformance(rows)) => {
                assert_eq!(rows[0].name, "Ahmet Yılm...");
                assert_eq!(rows[0].completed, 1);
                assert_eq!(rows[0].total, 2);
            }
            other => panic!("esperava o desempenho da equipe, veio {:?}", other),
        }
    }

    #[test]
    fn subscriber_gets_premium_badge() {
        let report = render(&policy(true, false), "sv");
        assert_eq!(report.badge, Some(AccessBadge::Premium));
        assert!(report.widgets.iter().all(|w| !w.locked));
    }
}
