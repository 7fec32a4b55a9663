// src/services/team_service.rs

use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        currency::{format_currency_in, CurrencyLocale},
        error::AppError,
    },
    db::{TaskRepository, TeamRepository},
    models::team::{CreateTeamMemberPayload, TeamMember, TeamMemberPatch, TeamMemberSummary, TeamMemberView},
    services::{entitlement::EntitlementPolicy, finance_service},
};

pub fn member_view(member: TeamMember, locale: CurrencyLocale) -> TeamMemberView {
    let balance = finance_service::balance(member.total_receivable, member.total_paid);
    let estimated_monthly_wage = finance_service::estimated_monthly_wage(member.daily_wage);

    TeamMemberView {
        formatted_monthly_wage: format_currency_in(estimated_monthly_wage, locale),
        formatted_balance: format_currency_in(balance, locale),
        balance,
        estimated_monthly_wage,
        member,
    }
}

#[derive(Clone)]
pub struct TeamService {
    repo: TeamRepository,
    task_repo: TaskRepository,
}

impl TeamService {
    pub fn new(repo: TeamRepository, task_repo: TaskRepository) -> Self {
        Self { repo, task_repo }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        locale: CurrencyLocale,
    ) -> Result<Vec<TeamMemberView>, AppError> {
        let members = self.repo.list(&mut *conn, user_id).await?;
        Ok(members.into_iter().map(|m| member_view(m, locale)).collect())
    }

    /// Membro + tarefas atribuídas a ele, por status.
    pub async fn summary(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        member_id: Uuid,
        locale: CurrencyLocale,
    ) -> Result<TeamMemberSummary, AppError> {
        let member = self
            .repo
            .find(&mut *conn, user_id, member_id)
            .await?
            .ok_or(AppError::NotFound("team_member"))?;
        let tasks = self.task_repo.list(&mut *conn, user_id, None).await?;

        Ok(TeamMemberSummary {
            tasks: finance_service::member_task_rollup(member_id, &tasks),
            member: member_view(member, locale),
        })
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user_id: Uuid,
        payload: &CreateTeamMemberPayload,
    ) -> Result<TeamMember, AppError> {
        payload.validate()?;
        policy.check_create_team_member()?;

        let member = self.repo.create(&mut *conn, user_id, payload).await?;
        tracing::info!("👷 Membro da equipe criado: {}", member.id);
        Ok(member)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        member_id: Uuid,
        patch: &TeamMemberPatch,
    ) -> Result<TeamMember, AppError> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        self.repo
            .update(&mut *conn, user_id, member_id, patch)
            .await?
            .ok_or(AppError::NotFound("team_member"))
    }

    pub async fn delete(&self, conn: &mut PgConnection, user_id: Uuid, member_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&mut *conn, user_id, member_id).await? {
            return Err(AppError::NotFound("team_member"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::finance_service::fixtures;
    use rust_decimal::Decimal;

    #[test]
    fn view_derives_balance_and_monthly_wage() {
        let mut member = fixtures::member("Ahmet");
        member.total_receivable = Some(Decimal::from(20_000));
        member.total_paid = Some(Decimal::from(5_000));

        let view = member_view(member, CurrencyLocale::Turkish);
        assert_eq!(view.balance, Decimal::from(15_000));
        assert_eq!(view.estimated_monthly_wage, Decimal::from(39_000));
        assert_eq!(view.formatted_monthly_wage, "₺39.000");
        assert_eq!(view.formatted_balance, "₺15.000");
    }

    #[test]
    fn overpaid_member_shows_negative_balance() {
        let mut member = fixtures::member("Mehmet");
        member.daily_wage = None;
        member.total_paid = Some(Decimal::from(1_200));

        let view = member_view(member, CurrencyLocale::English);
        assert_eq!(view.formatted_balance, "-$1,200");
        assert_eq!(view.formatted_monthly_wage, "$0");
    }
}
