// src/services/material_service.rs

use std::sync::Arc;

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        currency::{format_currency_in, CurrencyLocale},
        error::AppError,
    },
    db::{MaterialRepository, ProjectRepository},
    models::{
        auth::SessionUser,
        material::{
            BulkMaterialsPayload, CreateMaterialPayload, Material, MaterialListResponse, MaterialPatch,
            MaterialSuggestionsResponse, MaterialTotals, KNOWN_UNITS,
        },
        subscription::Feature,
    },
    services::{ai_service::AiDraftingClient, entitlement::EntitlementPolicy, finance_service},
};

pub fn list_response(materials: Vec<Material>, locale: CurrencyLocale) -> MaterialListResponse {
    // A lista já vem filtrada pelo banco
    let sums = finance_service::material_totals(&materials, None);

    MaterialListResponse {
        totals: MaterialTotals {
            count: sums.count,
            estimated: sums.estimated,
            actual: sums.actual,
            formatted_estimated: format_currency_in(sums.estimated, locale),
            formatted_actual: format_currency_in(sums.actual, locale),
        },
        materials,
        known_units: KNOWN_UNITS.iter().map(|unit| unit.to_string()).collect(),
    }
}

#[derive(Clone)]
pub struct MaterialService {
    repo: MaterialRepository,
    project_repo: ProjectRepository,
    ai: Arc<dyn AiDraftingClient>,
}

impl MaterialService {
    pub fn new(repo: MaterialRepository, project_repo: ProjectRepository, ai: Arc<dyn AiDraftingClient>) -> Self {
        Self { repo, project_repo, ai }
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        project_id: Option<Uuid>,
        locale: CurrencyLocale,
    ) -> Result<MaterialListResponse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materials = self.repo.list(executor, user_id, project_id).await?;
        Ok(list_response(materials, locale))
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
        payload.validate()?;
        self.repo.create(executor, user_id, payload).await
    }

    /// Insere todos ou nenhum: chamar com a conexão de uma transação.
    pub async fn create_bulk(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        payload: &BulkMaterialsPayload,
    ) -> Result<Vec<Material>, AppError> {
        payload.validate()?;

        let mut created = Vec::with_capacity(payload.materials.len());
        for item in &payload.materials {
            created.push(self.repo.create(&mut *conn, user_id, item).await?);
        }

        tracing::info!("📦 {} materiais inseridos em lote", created.len());
        Ok(created)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        material_id: Uuid,
        patch: &MaterialPatch,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        self.repo
            .update(executor, user_id, material_id, patch)
            .await?
            .ok_or(AppError::NotFound("material"))
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, material_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, user_id, material_id).await? {
            return Err(AppError::NotFound("material"));
        }
        Ok(())
    }

    /// Sugestões da IA para o projeto (Premium). Nada é salvo aqui;
    /// o cliente manda as aceitas para `create_bulk`.
    pub async fn suggest(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user: &SessionUser,
        project_id: Uuid,
    ) -> Result<MaterialSuggestionsResponse, AppError> {
        policy.check_feature(Feature::MaterialSuggestions)?;

        let project = self
            .project_repo
            .find(&mut *conn, user.id, project_id)
            .await?
            .ok_or(AppError::NotFound("project"))?;

        let materials = self
            .ai
            .suggest_materials(&user.token, &project.title, project.description.as_deref())
            .await?;

        Ok(MaterialSuggestionsResponse { materials })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::material::MaterialStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn material(estimated: Option<i64>, actual: Option<i64>) -> Material {
        Material {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            project_id: Uuid::nil(),
            name: "Çimento".to_string(),
            quantity: Decimal::from(100),
            unit: "torba".to_string(),
            estimated_cost: estimated.map(Decimal::from),
            actual_cost: actual.map(Decimal::from),
            status: MaterialStatus::Planned,
            supplier: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn totals_are_formatted_and_units_listed() {
        let response = list_response(
            vec![material(Some(15_000), Some(14_000)), material(Some(2_500), None)],
            CurrencyLocale::Turkish,
        );

        assert_eq!(response.totals.count, 2);
        assert_eq!(response.totals.formatted_estimated, "₺17.500");
        assert_eq!(response.totals.formatted_actual, "₺14.000");
        assert_eq!(response.known_units.len(), 9);
        assert_eq!(response.known_units[0], "adet");
    }

    #[test]
    fn empty_list_has_zero_totals() {
        let response = list_response(Vec::new(), CurrencyLocale::Swedish);
        assert_eq!(response.totals.count, 0);
        assert_eq!(response.totals.formatted_estimated, "0 kr");
    }
}
