// src/services/admin_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{admin_repo::GlobalCounts, AdminRepository, RoleRepository},
    models::{
        admin::{AdminStats, UserWithRole},
        auth::AppRole,
    },
};

pub fn stats_from(counts: GlobalCounts) -> AdminStats {
    // Assinaturas vivem no billing, por sessão: daqui todos contam como Standard
    let premium_users = 0;

    AdminStats {
        total_users: counts.users,
        premium_users,
        standard_users: counts.users - premium_users,
        total_projects: counts.projects,
        total_tasks: counts.tasks,
    }
}

#[derive(Clone)]
pub struct AdminService {
    repo: AdminRepository,
    role_repo: RoleRepository,
}

impl AdminService {
    pub fn new(repo: AdminRepository, role_repo: RoleRepository) -> Self {
        Self { repo, role_repo }
    }

    pub async fn stats(&self, conn: &mut PgConnection) -> Result<AdminStats, AppError> {
        let counts = self.repo.global_counts(&mut *conn).await?;
        Ok(stats_from(counts))
    }

    pub async fn list_users(&self, conn: &mut PgConnection) -> Result<Vec<UserWithRole>, AppError> {
        self.repo.list_users(&mut *conn).await
    }

    /// Chamar dentro de uma transação: o papel antigo só some se o novo entrar.
    pub async fn set_role(&self, conn: &mut PgConnection, user_id: Uuid, role: AppRole) -> Result<(), AppError> {
        if !self.repo.profile_exists(&mut *conn, user_id).await? {
            return Err(AppError::NotFound("user"));
        }

        self.role_repo.replace_role(&mut *conn, user_id, role).await?;
        tracing::info!("🔑 Papel de {} alterado para {:?}", user_id, role);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_user_counts_as_standard() {
        let stats = stats_from(GlobalCounts { users: 12, projects: 30, tasks: 140 });

        assert_eq!(stats.total_users, 12);
        assert_eq!(stats.premium_users, 0);
        assert_eq!(stats.standard_users, 12);
        assert_eq!(stats.total_projects, 30);
        assert_eq!(stats.total_tasks, 140);
    }
}
