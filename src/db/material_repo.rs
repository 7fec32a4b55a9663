// src/db/material_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::material::{CreateMaterialPayload, Material, MaterialPatch},
};

const MATERIAL_COLUMNS: &str = "id, user_id, project_id, name, quantity, unit, estimated_cost, \
     actual_cost, status, supplier, notes, created_at, updated_at";

#[derive(Clone, Default)]
pub struct MaterialRepository;

impl MaterialRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(MATERIAL_COLUMNS);
        qb.push(" FROM materials WHERE user_id = ").push_bind(user_id);
        if let Some(project_id) = project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        qb.push(" ORDER BY created_at DESC");

        let materials = qb.build_query_as::<Material>().fetch_all(executor).await?;

        Ok(materials)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateMaterialPayload,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO materials (
                user_id, project_id, name, quantity, unit, estimated_cost,
                actual_cost, status, supplier, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        );
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(user_id)
            .bind(payload.project_id)
            .bind(&payload.name)
            .bind(payload.quantity)
            .bind(&payload.unit)
            .bind(payload.estimated_cost.unwrap_or_default())
            .bind(payload.actual_cost.unwrap_or_default())
            .bind(payload.status)
            .bind(&payload.supplier)
            .bind(&payload.notes)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // FK de project_id: projeto inexistente vira 404, não 500
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::NotFound("project");
                    }
                }
                e.into()
            })?;

        Ok(material)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        material_id: Uuid,
        patch: &MaterialPatch,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE materials SET updated_at = NOW()");

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(quantity) = patch.quantity {
            qb.push(", quantity = ").push_bind(quantity);
        }
        if let Some(unit) = &patch.unit {
            qb.push(", unit = ").push_bind(unit.clone());
        }
        if let Some(estimated_cost) = patch.estimated_cost {
            qb.push(", estimated_cost = ").push_bind(estimated_cost);
        }
        if let Some(actual_cost) = patch.actual_cost {
            qb.push(", actual_cost = ").push_bind(actual_cost);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(supplier) = &patch.supplier {
            qb.push(", supplier = ").push_bind(supplier.clone());
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes.clone());
        }

        qb.push(" WHERE id = ").push_bind(material_id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(MATERIAL_COLUMNS);

        let material = qb
            .build_query_as::<Material>()
            .fetch_optional(executor)
            .await?;

        Ok(material)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, material_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1 AND user_id = $2")
            .bind(material_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
