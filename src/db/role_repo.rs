// src/db/role_repo.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::AppRole};

/// Store de papéis (`user_roles`). Consultado fora das transações RLS.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool, AppError> {
        let has_role: bool = sqlx::query_scalar("SELECT has_role($1, $2)")
            .bind(user_id)
            .bind(role)
            .fetch_one(&self.pool)
            .await?;

        Ok(has_role)
    }

    /// Troca o papel do usuário: remove os atuais e insere o novo.
    /// Chamar com a conexão de uma transação aberta.
    pub async fn replace_role(&self, conn: &mut PgConnection, user_id: Uuid, role: AppRole) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
