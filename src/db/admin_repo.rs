// src/db/admin_repo.rs

use sqlx::{Executor, PgConnection, Postgres};

use crate::{common::error::AppError, models::admin::UserWithRole};

/// Contagens globais do painel. Só funciona com o RLS de um administrador.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalCounts {
    pub users: i64,
    pub projects: i64,
    pub tasks: i64,
}

#[derive(Clone, Default)]
pub struct AdminRepository;

impl AdminRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn global_counts(&self, conn: &mut PgConnection) -> Result<GlobalCounts, AppError> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&mut *conn)
            .await?;
        let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&mut *conn)
            .await?;
        let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&mut *conn)
            .await?;

        Ok(GlobalCounts { users, projects, tasks })
    }

    pub async fn list_users<'e, E>(&self, executor: E) -> Result<Vec<UserWithRole>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Um usuário com mais de um papel aparece com o de maior privilégio
        let users = sqlx::query_as::<_, UserWithRole>(
            r#"
            SELECT
                p.id, p.email, p.full_name, p.created_at,
                (
                    SELECT r.role FROM user_roles r
                    WHERE r.user_id = p.id
                    ORDER BY r.role ASC
                    LIMIT 1
                ) AS role
            FROM profiles p
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(users)
    }

    pub async fn profile_exists<'e, E>(&self, executor: E, user_id: uuid::Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
            .bind(user_id)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }
}
