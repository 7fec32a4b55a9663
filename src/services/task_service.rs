// src/services/task_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::TaskRepository,
    models::task::{CreateTaskPayload, Task, TaskPatch},
};

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
}

impl TaskService {
    pub fn new(repo: TaskRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid, project_id: Option<Uuid>) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, user_id, project_id).await
    }

    pub async fn create<'e, E>(&self, executor: E, user_id: Uuid, payload: &CreateTaskPayload) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo.create(executor, user_id, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        self.repo
            .update(executor, user_id, task_id, patch)
            .await?
            .ok_or(AppError::NotFound("task"))
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, task_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, user_id, task_id).await? {
            return Err(AppError::NotFound("task"));
        }
        Ok(())
    }
}
