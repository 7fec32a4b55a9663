// src/db/task_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{CreateTaskPayload, Task, TaskPatch},
};

const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, project_id, \
     assigned_to, due_date, estimated_cost, created_at, updated_at";

#[derive(Clone, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lista as tarefas do usuário, opcionalmente só de um projeto.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TASK_COLUMNS);
        qb.push(" FROM tasks WHERE user_id = ").push_bind(user_id);
        if let Some(project_id) = project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        qb.push(" ORDER BY due_date ASC");

        let tasks = qb.build_query_as::<Task>().fetch_all(executor).await?;

        Ok(tasks)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateTaskPayload,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO tasks (
                user_id, title, description, status, priority, project_id,
                assigned_to, due_date, estimated_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(payload.status)
            .bind(payload.priority)
            .bind(payload.project_id)
            .bind(payload.assigned_to)
            .bind(payload.due_date)
            .bind(payload.estimated_cost.unwrap_or_default())
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(priority) = patch.priority {
            qb.push(", priority = ").push_bind(priority);
        }
        if let Some(project_id) = patch.project_id {
            qb.push(", project_id = ").push_bind(project_id);
        }
        if let Some(assigned_to) = patch.assigned_to {
            qb.push(", assigned_to = ").push_bind(assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }
        if let Some(estimated_cost) = patch.estimated_cost {
            qb.push(", estimated_cost = ").push_bind(estimated_cost);
        }

        qb.push(" WHERE id = ").push_bind(task_id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(TASK_COLUMNS);

        let task = qb.build_query_as::<Task>().fetch_optional(executor).await?;

        Ok(task)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, task_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
