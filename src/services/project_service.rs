// src/services/project_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        currency::{format_currency_in, format_date, CurrencyLocale},
        error::AppError,
    },
    db::ProjectRepository,
    models::{
        auth::SessionUser,
        project::{CreateProjectPayload, Project, ProjectOverview, ProjectPatch},
        subscription::LimitedResource,
    },
    services::{
        entitlement::EntitlementPolicy,
        finance_service,
        storage::{image_extension, FileStorage, PROJECT_PHOTOS_BUCKET},
    },
};

/// Projeto com os valores derivados que a listagem mostra.
pub fn overview(project: Project, locale: CurrencyLocale, max_photos: u32) -> ProjectOverview {
    let ratio = finance_service::budget_utilization(project.budget, project.actual_cost);

    ProjectOverview {
        budget_utilization: finance_service::utilization_view(ratio),
        formatted_budget: format_currency_in(project.budget.unwrap_or_default(), locale),
        formatted_actual_cost: format_currency_in(project.actual_cost.unwrap_or_default(), locale),
        formatted_revenue: format_currency_in(project.revenue.unwrap_or_default(), locale),
        formatted_start_date: format_date(project.start_date, locale),
        formatted_end_date: format_date(project.end_date, locale),
        max_photos,
        project,
    }
}

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    storage: Arc<dyn FileStorage>,
}

impl ProjectService {
    pub fn new(repo: ProjectRepository, storage: Arc<dyn FileStorage>) -> Self {
        Self { repo, storage }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        locale: CurrencyLocale,
        max_photos: u32,
    ) -> Result<Vec<ProjectOverview>, AppError> {
        let projects = self.repo.list(&mut *conn, user_id).await?;
        Ok(projects
            .into_iter()
            .map(|project| overview(project, locale, max_photos))
            .collect())
    }

    pub async fn get(&self, conn: &mut PgConnection, user_id: Uuid, project_id: Uuid) -> Result<Project, AppError> {
        self.repo
            .find(&mut *conn, user_id, project_id)
            .await?
            .ok_or(AppError::NotFound("project"))
    }

    /// A política já vem montada com as contagens desta mesma transação.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError> {
        payload.validate()?;
        policy.check_create_project()?;

        let project = self.repo.create(&mut *conn, user_id, payload).await?;
        tracing::info!("🏗️ Projeto criado: {} ({})", project.title, project.id);
        Ok(project)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        project_id: Uuid,
        patch: &ProjectPatch,
    ) -> Result<Project, AppError> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        self.repo
            .update(&mut *conn, user_id, project_id, patch)
            .await?
            .ok_or(AppError::NotFound("project"))
    }

    pub async fn delete(&self, conn: &mut PgConnection, user_id: Uuid, project_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&mut *conn, user_id, project_id).await? {
            return Err(AppError::NotFound("project"));
        }
        Ok(())
    }

    /// Envia a foto ao storage e acrescenta a URL pública ao fim da lista.
    /// A linha do projeto fica travada desde a conferência do limite.
    pub async fn add_photo(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user: &SessionUser,
        project_id: Uuid,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Project, AppError> {
        let project = self.repo
            .find_for_update(&mut *conn, user.id, project_id)
            .await?
            .ok_or(AppError::NotFound("project"))?;
        policy.check_add_photo(project.photos.len())?;

        let extension = image_extension(content_type)
            .ok_or_else(|| AppError::UnsupportedMediaType(content_type.to_string()))?;
        let path = format!("{}/{}/{}.{}", user.id, project_id, Uuid::new_v4(), extension);

        self.storage
            .upload(&user.token, PROJECT_PHOTOS_BUCKET, &path, bytes, content_type)
            .await?;

        let url = self.storage.public_url(PROJECT_PHOTOS_BUCKET, &path);
        let max_photos = i32::try_from(policy.max_photos_allowed()).unwrap_or(i32::MAX);
        let updated = self.repo
            .append_photo(&mut *conn, user.id, project_id, &url, max_photos)
            .await?;

        appended_or_full(updated, policy)
    }

    /// Remove a URL da lista. O arquivo fica no storage.
    pub async fn remove_photo(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        project_id: Uuid,
        url: &str,
    ) -> Result<Project, AppError> {
        self.get(&mut *conn, user_id, project_id).await?;

        self.repo
            .remove_photo(&mut *conn, user_id, project_id, url)
            .await?
            .ok_or(AppError::NotFound("photo"))
    }
}

/// O UPDATE condicional não devolveu linha: a lista já estava cheia.
fn appended_or_full(updated: Option<Project>, policy: &EntitlementPolicy) -> Result<Project, AppError> {
    match updated {
        Some(project) => Ok(project),
        None => {
            let limit = i64::from(policy.max_photos_allowed());
            Err(AppError::PlanLimitReached { resource: LimitedResource::Photos, current: limit, limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::subscription::PlanLimits,
        services::{entitlement::ResourceCounts, finance_service::fixtures},
    };
    use rust_decimal::Decimal;

    fn standard_policy() -> EntitlementPolicy {
        EntitlementPolicy::new(false, false, ResourceCounts::default(), PlanLimits::default())
    }

    #[test]
    fn overview_formats_for_the_caller_locale() {
        let project = fixtures::project("Villa", 500_000, 325_000, 600_000);
        let view = overview(project, CurrencyLocale::Swedish, 2);

        assert_eq!(view.formatted_budget, "500 000 kr");
        assert_eq!(view.formatted_actual_cost, "325 000 kr");
        assert_eq!(view.budget_utilization.label, "65%");
        assert_eq!(view.budget_utilization.bar_width, Decimal::from(65));
        assert_eq!(view.max_photos, 2);
    }

    #[test]
    fn overview_treats_missing_money_as_zero() {
        let mut project = fixtures::project("Boş", 0, 0, 0);
        project.budget = None;
        project.actual_cost = None;
        project.revenue = None;

        let view = overview(project, CurrencyLocale::Turkish, 4);
        assert_eq!(view.formatted_budget, "₺0");
        assert_eq!(view.budget_utilization.label, "0%");
    }

    #[test]
    fn full_photo_list_is_reported_as_plan_limit() {
        let policy = standard_policy();

        match appended_or_full(None, &policy) {
            Err(AppError::PlanLimitReached { resource, current, limit }) => {
                assert_eq!(resource, LimitedResource::Photos);
                assert_eq!(current, limit);
                assert_eq!(limit, i64::from(policy.max_photos_allowed()));
            }
            other => panic!("esperava PlanLimitReached, veio {:?}", other),
        }
    }

    #[test]
    fn appended_row_is_returned_as_is() {
        let mut project = fixtures::project("Villa", 1, 1, 1);
        project.photos = vec!["a.jpg".to_string(), "b.jpg".to_string()];

        let updated = appended_or_full(Some(project), &standard_policy()).unwrap();
        assert_eq!(updated.photos, ["a.jpg", "b.jpg"]);
    }
}
