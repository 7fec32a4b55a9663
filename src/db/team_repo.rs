// src/db/team_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::team::{CreateTeamMemberPayload, TeamMember, TeamMemberPatch},
};

const MEMBER_COLUMNS: &str =
    "id, user_id, name, phone, specialty, daily_wage, total_receivable, total_paid, created_at, updated_at";

#[derive(Clone, Default)]
pub struct TeamRepository;

impl TeamRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM team_members WHERE user_id = $1 ORDER BY created_at DESC",
            MEMBER_COLUMNS
        );
        let members = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(members)
    }

    pub async fn count<'e, E>(&self, executor: E, user_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM team_members WHERE id = $1 AND user_id = $2",
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(member_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(member)
    }

    /// Membros por id (equipe atribuída a um projeto). Ids desconhecidos são ignorados.
    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<Vec<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM team_members WHERE user_id = $1 AND id = ANY($2) ORDER BY name",
            MEMBER_COLUMNS
        );
        let members = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(user_id)
            .bind(member_ids)
            .fetch_all(executor)
            .await?;

        Ok(members)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateTeamMemberPayload,
    ) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO team_members (user_id, name, phone, specialty, daily_wage, total_receivable, total_paid)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(user_id)
            .bind(&payload.name)
            .bind(&payload.phone)
            .bind(&payload.specialty)
            .bind(payload.daily_wage.unwrap_or_default())
            .bind(payload.total_receivable.unwrap_or_default())
            .bind(payload.total_paid.unwrap_or_default())
            .fetch_one(executor)
            .await?;

        Ok(member)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        member_id: Uuid,
        patch: &TeamMemberPatch,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE team_members SET updated_at = NOW()");

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone.clone());
        }
        if let Some(specialty) = &patch.specialty {
            qb.push(", specialty = ").push_bind(specialty.clone());
        }
        if let Some(daily_wage) = patch.daily_wage {
            qb.push(", daily_wage = ").push_bind(daily_wage);
        }
        if let Some(total_receivable) = patch.total_receivable {
            qb.push(", total_receivable = ").push_bind(total_receivable);
        }
        if let Some(total_paid) = patch.total_paid {
            qb.push(", total_paid = ").push_bind(total_paid);
        }

        qb.push(" WHERE id = ").push_bind(member_id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(MEMBER_COLUMNS);

        let member = qb
            .build_query_as::<TeamMember>()
            .fetch_optional(executor)
            .await?;

        Ok(member)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, member_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1 AND user_id = $2")
            .bind(member_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
