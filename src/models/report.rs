// src/models/report.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{project::UtilizationView, subscription::Feature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AccessBadge {
    Admin,
    Premium,
}

// 1. Indicadores básicos (todos os planos)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasicKpis {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub task_completion_rate: u32,
    #[schema(value_type = String)]
    pub total_budget: Decimal,
    #[schema(example = "₺1.250.000")]
    pub formatted_total_budget: String,
}

// 2. Widgets avançados (Premium)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    #[schema(value_type = String)]
    pub total_actual_cost: Decimal,
    #[schema(value_type = String)]
    pub net_profit: Decimal,
    /// Em %, com sinal, para o texto
    #[schema(value_type = String)]
    pub profit_margin: Decimal,
    /// Limitado a >= 0, para a barra
    #[schema(value_type = String)]
    pub profit_margin_bar: Decimal,
    pub budget_utilization: UtilizationView,
    pub formatted_revenue: String,
    pub formatted_actual_cost: String,
    pub formatted_net_profit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusBreakdown {
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusBreakdown {
    pub active: usize,
    pub completed: usize,
    pub on_hold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFinanceRow {
    #[schema(example = "Villa Renovatio...")]
    pub name: String,
    #[schema(value_type = String)]
    pub budget: Decimal,
    #[schema(value_type = String)]
    pub actual_cost: Decimal,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformanceRow {
    #[schema(example = "Ahmet Yılm...")]
    pub name: String,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum WidgetData {
    FinancialSummary(FinancialSummary),
    TaskStatus(TaskStatusBreakdown),
    ProjectStatus(ProjectStatusBreakdown),
    ProjectFinance(Vec<ProjectFinanceRow>),
    TeamPerformance(Vec<TeamPerformanceRow>),
}

/// Widget do relatório. Bloqueado = só título, descrição e o preço para upgrade.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportWidget {
    #[schema(example = "financialSummary")]
    pub key: String,
    pub title: String,
    pub description: String,
    pub locked: bool,
    pub feature: Feature,
    pub data: Option<WidgetData>,
    pub upgrade_price_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub badge: Option<AccessBadge>,
    pub basic: BasicKpis,
    pub widgets: Vec<ReportWidget>,
}
