// src/services/finance_service.rs
//
// Agregações financeiras sobre listas já carregadas do banco.
// Funções totais: lista vazia ou valor nulo contam como zero, nunca erro.

use std::collections::HashMap;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{
    material::Material,
    project::{Project, ProjectStatus, UtilizationView},
    report::{ProjectFinanceRow, ProjectStatusBreakdown, TaskStatusBreakdown, TeamPerformanceRow},
    task::{Task, TaskStatus},
    team::{MemberTaskRollup, TeamMember},
};

// Dias trabalhados considerados para a estimativa mensal
pub const WORKING_DAYS_PER_MONTH: u32 = 26;

const PROJECT_FINANCE_ROWS: usize = 5;
const PROJECT_TITLE_MAX_CHARS: usize = 15;
const MEMBER_NAME_MAX_CHARS: usize = 10;

fn hundred() -> Decimal {
    Decimal::ONE_HUNDRED
}

// =============================================================================
//  PROJETOS
// =============================================================================

pub fn total_budget(projects: &[Project]) -> Decimal {
    projects.iter().map(|p| p.budget.unwrap_or_default()).sum()
}

pub fn total_revenue(projects: &[Project]) -> Decimal {
    projects.iter().map(|p| p.revenue.unwrap_or_default()).sum()
}

pub fn total_actual_cost(projects: &[Project]) -> Decimal {
    projects.iter().map(|p| p.actual_cost.unwrap_or_default()).sum()
}

pub fn net_profit(projects: &[Project]) -> Decimal {
    total_revenue(projects) - total_actual_cost(projects)
}

/// Lucro líquido / receita, com sinal. Zero quando não há receita.
pub fn profit_margin(projects: &[Project]) -> Decimal {
    let revenue = total_revenue(projects);
    if revenue <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    net_profit(projects) / revenue
}

/// A mesma margem em % (texto do relatório).
pub fn profit_margin_percent(projects: &[Project]) -> Decimal {
    profit_margin(projects) * hundred()
}

/// Margem em % para a barra de progresso: nunca negativa.
pub fn profit_margin_bar(projects: &[Project]) -> Decimal {
    profit_margin_percent(projects).max(Decimal::ZERO)
}

/// Custo real / orçamento, sem limite superior. Zero sem orçamento.
pub fn budget_utilization(budget: Option<Decimal>, actual_cost: Option<Decimal>) -> Decimal {
    let budget = budget.unwrap_or_default();
    if budget <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    actual_cost.unwrap_or_default() / budget
}

/// Largura da barra limitada a [0, 100]; o rótulo mostra o valor real ("130%").
pub fn utilization_view(utilization: Decimal) -> UtilizationView {
    let percent = utilization * hundred();
    let bar_width = percent.max(Decimal::ZERO).min(hundred());
    let label = percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    UtilizationView {
        bar_width,
        label: format!("{}%", label),
    }
}

pub fn project_status_breakdown(projects: &[Project]) -> ProjectStatusBreakdown {
    let mut breakdown = ProjectStatusBreakdown::default();
    for project in projects {
        match project.status {
            ProjectStatus::Active => breakdown.active += 1,
            ProjectStatus::Completed => breakdown.completed += 1,
            ProjectStatus::OnHold => breakdown.on_hold += 1,
            ProjectStatus::Planning | ProjectStatus::Pending => {}
        }
    }
    breakdown
}

/// Os primeiros projetos da lista, com o título encurtado para o gráfico.
pub fn project_finance_rows(projects: &[Project]) -> Vec<ProjectFinanceRow> {
    projects
        .iter()
        .take(PROJECT_FINANCE_ROWS)
        .map(|p| ProjectFinanceRow {
            name: truncate_label(&p.title, PROJECT_TITLE_MAX_CHARS),
            budget: p.budget.unwrap_or_default(),
            actual_cost: p.actual_cost.unwrap_or_default(),
            revenue: p.revenue.unwrap_or_default(),
        })
        .collect()
}

/// Quantos projetos cada cliente tem.
pub fn customer_project_counts(projects: &[Project]) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();
    for customer_id in projects.iter().filter_map(|p| p.customer_id) {
        *counts.entry(customer_id).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
//  TAREFAS E EQUIPE
// =============================================================================

/// Percentual de tarefas concluídas, arredondado. Zero para lista vazia.
pub fn task_completion_rate(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
    let rate = Decimal::from(completed as u64) * hundred() / Decimal::from(tasks.len() as u64);

    rate.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

pub fn task_status_breakdown(tasks: &[Task]) -> TaskStatusBreakdown {
    let mut breakdown = TaskStatusBreakdown::default();
    for task in tasks {
        match task.status {
            TaskStatus::Completed => breakdown.completed += 1,
            TaskStatus::InProgress => breakdown.in_progress += 1,
            TaskStatus::Pending => breakdown.pending += 1,
        }
    }
    breakdown
}

pub fn member_task_rollup(member_id: Uuid, tasks: &[Task]) -> MemberTaskRollup {
    let mut rollup = MemberTaskRollup::default();
    for task in tasks.iter().filter(|t| t.assigned_to == Some(member_id)) {
        rollup.total += 1;
        match task.status {
            TaskStatus::Completed => rollup.completed += 1,
            TaskStatus::InProgress => rollup.in_progress += 1,
            TaskStatus::Pending => rollup.pending += 1,
        }
    }
    rollup
}

pub fn team_performance(members: &[TeamMember], tasks: &[Task]) -> Vec<TeamPerformanceRow> {
    members
        .iter()
        .map(|member| {
            let rollup = member_task_rollup(member.id, tasks);
            TeamPerformanceRow {
                name: truncate_label(&member.name, MEMBER_NAME_MAX_CHARS),
                completed: rollup.completed,
                total: rollup.total,
            }
        })
        .collect()
}

// =============================================================================
//  SALDOS
// =============================================================================

/// A receber - pago (clientes e membros da equipe).
pub fn balance(total_receivable: Option<Decimal>, total_paid: Option<Decimal>) -> Decimal {
    total_receivable.unwrap_or_default() - total_paid.unwrap_or_default()
}

pub fn estimated_monthly_wage(daily_wage: Option<Decimal>) -> Decimal {
    daily_wage.unwrap_or_default() * Decimal::from(WORKING_DAYS_PER_MONTH)
}

// =============================================================================
//  MATERIAIS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialSums {
    pub count: usize,
    pub estimated: Decimal,
    pub actual: Decimal,
}

pub fn material_totals(materials: &[Material], project_id: Option<Uuid>) -> MaterialSums {
    materials
        .iter()
        .filter(|m| project_id.is_none_or(|id| m.project_id == id))
        .fold(MaterialSums::default(), |mut sums, m| {
            sums.count += 1;
            sums.estimated += m.estimated_cost.unwrap_or_default();
            sums.actual += m.actual_cost.unwrap_or_default();
            sums
        })
}

// Corta em caracteres (não bytes): nomes turcos têm acentos.
fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{
        project::{Project, ProjectStatus},
        task::{Task, TaskPriority, TaskStatus},
        team::TeamMember,
    };

    pub fn project(title: &str, budget: i64, actual_cost: i64, revenue: i64) -> Project {
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.to_string(),
            description: None,
            status: ProjectStatus::Active,
            progress: 0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            assigned_team: Vec::new(),
            customer_id: None,
            budget: Some(Decimal::from(budget)),
            actual_cost: Some(Decimal::from(actual_cost)),
            revenue: Some(Decimal::from(revenue)),
            photos: Vec::new(),
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn task(status: TaskStatus, assigned_to: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "Tarefa".to_string(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            project_id: None,
            assigned_to,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            estimated_cost: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn member(name: &str) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            phone: "0555".to_string(),
            specialty: "Usta".to_string(),
            daily_wage: Some(Decimal::from(1500)),
            total_receivable: None,
            total_paid: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{member, project, task};
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_collections_aggregate_to_zero() {
        assert_eq!(total_budget(&[]), Decimal::ZERO);
        assert_eq!(net_profit(&[]), Decimal::ZERO);
        assert_eq!(profit_margin(&[]), Decimal::ZERO);
        assert_eq!(task_completion_rate(&[]), 0);
        assert_eq!(material_totals(&[], None), MaterialSums::default());
    }

    #[test]
    fn missing_monetary_fields_count_as_zero() {
        let mut p = project("Depo", 0, 0, 0);
        p.budget = None;
        p.actual_cost = None;
        p.revenue = Some(Decimal::from(1000));

        assert_eq!(total_budget(&[p.clone()]), Decimal::ZERO);
        assert_eq!(net_profit(&[p.clone()]), Decimal::from(1000));
        assert_eq!(budget_utilization(p.budget, p.actual_cost), Decimal::ZERO);
    }

    #[test]
    fn utilization_of_sixty_five_percent_renders_label_and_bar() {
        let p = project("Villa", 500_000, 325_000, 0);
        let utilization = budget_utilization(p.budget, p.actual_cost);
        assert_eq!(utilization, Decimal::new(65, 2));

        let view = utilization_view(utilization);
        assert_eq!(view.label, "65%");
        assert_eq!(view.bar_width, Decimal::from(65));
    }

    #[test]
    fn over_budget_clamps_bar_but_not_label() {
        let view = utilization_view(budget_utilization(Some(Decimal::from(100)), Some(Decimal::from(130))));
        assert_eq!(view.bar_width, Decimal::from(100));
        assert_eq!(view.label, "130%");
    }

    #[test]
    fn negative_margin_is_signed_for_text_and_clamped_for_bar() {
        let projects = vec![project("Zarar", 0, 150, 100)];
        assert_eq!(profit_margin(&projects), Decimal::new(-5, 1));
        assert_eq!(profit_margin_percent(&projects), Decimal::from(-50));
        assert_eq!(profit_margin_bar(&projects), Decimal::ZERO);
    }

    #[test]
    fn margin_is_a_ratio_like_utilization() {
        let projects = vec![project("Villa", 0, 150, 200)];
        assert_eq!(profit_margin(&projects), Decimal::new(25, 2));
        assert_eq!(profit_margin_percent(&projects), Decimal::from(25));
        assert_eq!(profit_margin_bar(&projects), Decimal::from(25));
    }

    #[test]
    fn completion_rate_rounds_to_whole_percent() {
        let tasks = vec![
            task(TaskStatus::Completed, None),
            task(TaskStatus::Pending, None),
            task(TaskStatus::InProgress, None),
        ];
        assert_eq!(task_completion_rate(&tasks), 33);

        let tasks = vec![task(TaskStatus::Completed, None), task(TaskStatus::Completed, None), task(TaskStatus::Pending, None)];
        assert_eq!(task_completion_rate(&tasks), 67);
    }

    #[test]
    fn member_rollup_only_counts_assigned_tasks() {
        let ahmet = member("Ahmet Yılmaz Usta");
        let other = Uuid::new_v4();
        let tasks = vec![
            task(TaskStatus::Completed, Some(ahmet.id)),
            task(TaskStatus::InProgress, Some(ahmet.id)),
            task(TaskStatus::Completed, Some(other)),
            task(TaskStatus::Pending, None),
        ];

        let rollup = member_task_rollup(ahmet.id, &tasks);
        assert_eq!(rollup, MemberTaskRollup { total: 2, completed: 1, in_progress: 1, pending: 0 });

        let rows = team_performance(&[ahmet], &tasks);
        assert_eq!(rows[0].name, "Ahmet Yılm...");
        assert_eq!((rows[0].completed, rows[0].total), (1, 2));
    }

    #[test]
    fn finance_rows_keep_first_five_with_short_titles() {
        let projects: Vec<_> = (0..7)
            .map(|i| project(&format!("Büyük Konut Projesi {}", i), 100, 50, 200))
            .collect();
        let rows = project_finance_rows(&projects);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].name, "Büyük Konut Pro...");
    }

    #[test]
    fn balances_and_monthly_wage() {
        assert_eq!(balance(Some(Decimal::from(250_000)), Some(Decimal::from(100_000))), Decimal::from(150_000));
        assert_eq!(balance(None, Some(Decimal::from(10))), Decimal::from(-10));
        assert_eq!(estimated_monthly_wage(Some(Decimal::from(1500))), Decimal::from(39_000));
        assert_eq!(estimated_monthly_wage(None), Decimal::ZERO);
    }

    #[test]
    fn customer_counts_ignore_projects_without_customer() {
        let customer = Uuid::new_v4();
        let mut a = project("A", 0, 0, 0);
        a.customer_id = Some(customer);
        let mut b = project("B", 0, 0, 0);
        b.customer_id = Some(customer);
        let c = project("C", 0, 0, 0);

        let counts = customer_project_counts(&[a, b, c]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&customer], 2);
    }

    fn money() -> impl Strategy<Value = Option<Decimal>> {
        prop_oneof![
            Just(None),
            (0i64..1_000_000_000, 0u32..3).prop_map(|(n, scale)| Some(Decimal::new(n, scale))),
        ]
    }

    fn projects() -> impl Strategy<Value = Vec<Project>> {
        prop::collection::vec((money(), money(), money()), 0..12).prop_map(|rows| {
            rows.into_iter()
                .map(|(budget, actual_cost, revenue)| {
                    let mut p = project("P", 0, 0, 0);
                    p.budget = budget;
                    p.actual_cost = actual_cost;
                    p.revenue = revenue;
                    p
                })
                .collect()
        })
    }

    fn statuses() -> impl Strategy<Value = Vec<TaskStatus>> {
        prop::collection::vec(
            prop_oneof![Just(TaskStatus::Pending), Just(TaskStatus::InProgress), Just(TaskStatus::Completed)],
            0..40,
        )
    }

    proptest! {
        #[test]
        fn net_profit_is_revenue_minus_cost(projects in projects()) {
            prop_assert_eq!(net_profit(&projects), total_revenue(&projects) - total_actual_cost(&projects));
        }

        #[test]
        fn completion_rate_stays_within_bounds(statuses in statuses()) {
            let tasks: Vec<_> = statuses.into_iter().map(|s| task(s, None)).collect();
            let rate = task_completion_rate(&tasks);
            prop_assert!(rate <= 100);
            if tasks.is_empty() {
                prop_assert_eq!(rate, 0);
            }
        }

        #[test]
        fn aggregation_is_idempotent(projects in projects()) {
            prop_assert_eq!(total_budget(&projects), total_budget(&projects));
            prop_assert_eq!(profit_margin(&projects), profit_margin(&projects));
            prop_assert_eq!(project_finance_rows(&projects), project_finance_rows(&projects));
        }

        #[test]
        fn utilization_bar_is_always_between_zero_and_hundred(budget in money(), cost in money()) {
            let view = utilization_view(budget_utilization(budget, cost));
            prop_assert!(view.bar_width >= Decimal::ZERO);
            prop_assert!(view.bar_width <= Decimal::ONE_HUNDRED);
        }
    }
}
