// src/db/project_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{CreateProjectPayload, Project, ProjectPatch},
};

const PROJECT_COLUMNS: &str = "id, user_id, title, description, status, progress, start_date, end_date, \
     assigned_team, customer_id, budget, actual_cost, revenue, photos, created_at, updated_at";

#[derive(Clone, Default)]
pub struct ProjectRepository;

impl ProjectRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(projects)
    }

    pub async fn count<'e, E>(&self, executor: E, user_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(project)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO projects (
                user_id, title, description, status, progress, start_date, end_date,
                assigned_team, customer_id, budget, actual_cost, revenue
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(payload.status)
            .bind(payload.progress)
            .bind(payload.start_date)
            .bind(payload.end_date)
            .bind(&payload.assigned_team)
            .bind(payload.customer_id)
            // Ausente = 0, como o default da coluna
            .bind(payload.budget.unwrap_or_default())
            .bind(payload.actual_cost.unwrap_or_default())
            .bind(payload.revenue.unwrap_or_default())
            .fetch_one(executor)
            .await?;

        Ok(project)
    }

    /// Aplica só os campos presentes no patch. `None` se o projeto não existe para este usuário.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Uuid,
        patch: &ProjectPatch,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = NOW()");

        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(progress) = patch.progress {
            qb.push(", progress = ").push_bind(progress);
        }
        if let Some(start_date) = patch.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        if let Some(end_date) = patch.end_date {
            qb.push(", end_date = ").push_bind(end_date);
        }
        if let Some(assigned_team) = &patch.assigned_team {
            qb.push(", assigned_team = ").push_bind(assigned_team.clone());
        }
        if let Some(customer_id) = patch.customer_id {
            qb.push(", customer_id = ").push_bind(customer_id);
        }
        if let Some(budget) = patch.budget {
            qb.push(", budget = ").push_bind(budget);
        }
        if let Some(actual_cost) = patch.actual_cost {
            qb.push(", actual_cost = ").push_bind(actual_cost);
        }
        if let Some(revenue) = patch.revenue {
            qb.push(", revenue = ").push_bind(revenue);
        }

        qb.push(" WHERE id = ").push_bind(project_id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(PROJECT_COLUMNS);

        let project = qb
            .build_query_as::<Project>()
            .fetch_optional(executor)
            .await?;

        Ok(project)
    }

    /// Como `find`, mas trava a linha até o fim da transação.
    /// Uploads concorrentes no mesmo projeto passam um de cada vez.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2 FOR UPDATE",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(project)
    }

    /// Acrescenta a URL ao fim da lista, só se ainda couber em `max_photos`.
    /// `None`: projeto inexistente ou lista cheia.
    pub async fn append_photo<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Uuid,
        url: &str,
        max_photos: i32,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = append_photo_sql();
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(url)
            .bind(project_id)
            .bind(user_id)
            .bind(max_photos)
            .fetch_optional(executor)
            .await?;

        Ok(project)
    }

    /// Tira a URL da lista. `None`: projeto inexistente ou URL ausente.
    pub async fn remove_photo<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Uuid,
        url: &str,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = remove_photo_sql();
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(url)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(project)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, project_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// A lista é alterada dentro do próprio UPDATE, nunca a partir de uma cópia lida antes.
fn append_photo_sql() -> String {
    format!(
        "UPDATE projects SET photos = array_append(photos, $1), updated_at = NOW() \
         WHERE id = $2 AND user_id = $3 AND cardinality(photos) < $4 RETURNING {}",
        PROJECT_COLUMNS
    )
}

fn remove_photo_sql() -> String {
    format!(
        "UPDATE projects SET photos = array_remove(photos, $1), updated_at = NOW() \
         WHERE id = $2 AND user_id = $3 AND $1 = ANY(photos) RETURNING {}",
        PROJECT_COLUMNS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_updates_change_the_array_in_place() {
        let append = append_photo_sql();
        assert!(append.contains("photos = array_append(photos, $1)"));
        assert!(append.contains("cardinality(photos) < $4"));
        assert!(!append.contains("photos = $1"));

        let remove = remove_photo_sql();
        assert!(remove.contains("photos = array_remove(photos, $1)"));
        assert!(remove.contains("$1 = ANY(photos)"));
    }
}
