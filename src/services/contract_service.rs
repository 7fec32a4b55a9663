// src/services/contract_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, ProjectRepository, TeamRepository},
    models::{
        auth::SessionUser,
        contract::{ContractCustomer, ContractDraft, ContractMember, ContractPdfPayload, ContractProject, ContractRequest},
        customer::Customer,
        project::Project,
        subscription::Feature,
        team::TeamMember,
    },
    services::{
        ai_service::AiDraftingClient,
        document_service::{contract_filename, DocumentService},
        entitlement::EntitlementPolicy,
    },
};

/// PDF pronto para download.
pub struct ContractPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Contexto que a IA recebe para redigir o contrato.
pub fn contract_request(project: &Project, customer: Option<&Customer>, team: &[TeamMember]) -> ContractRequest {
    ContractRequest {
        project: ContractProject {
            title: project.title.clone(),
            description: project.description.clone(),
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
            actual_cost: project.actual_cost,
            revenue: project.revenue,
            status: project.status,
            progress: project.progress,
        },
        customer: customer.map(|c| ContractCustomer {
            name: c.name.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
        }),
        team_members: team
            .iter()
            .map(|m| ContractMember {
                name: m.name.clone(),
                specialty: m.specialty.clone(),
                daily_wage: m.daily_wage,
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct ContractService {
    project_repo: ProjectRepository,
    customer_repo: CustomerRepository,
    team_repo: TeamRepository,
    ai: Arc<dyn AiDraftingClient>,
    documents: DocumentService,
}

impl ContractService {
    pub fn new(
        project_repo: ProjectRepository,
        customer_repo: CustomerRepository,
        team_repo: TeamRepository,
        ai: Arc<dyn AiDraftingClient>,
        documents: DocumentService,
    ) -> Self {
        Self { project_repo, customer_repo, team_repo, ai, documents }
    }

    async fn project(&self, conn: &mut PgConnection, user_id: Uuid, project_id: Uuid) -> Result<Project, AppError> {
        self.project_repo
            .find(&mut *conn, user_id, project_id)
            .await?
            .ok_or(AppError::NotFound("project"))
    }

    pub async fn draft(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user: &SessionUser,
        project_id: Uuid,
    ) -> Result<ContractDraft, AppError> {
        policy.check_feature(Feature::ContractGeneration)?;

        let project = self.project(&mut *conn, user.id, project_id).await?;
        let customer = match project.customer_id {
            Some(customer_id) => self.customer_repo.find(&mut *conn, user.id, customer_id).await?,
            None => None,
        };
        let team = self
            .team_repo
            .find_many(&mut *conn, user.id, &project.assigned_team)
            .await?;

        let request = contract_request(&project, customer.as_ref(), &team);
        let contract = self.ai.generate_contract(&user.token, &request).await?;

        tracing::info!("📝 Minuta de contrato gerada para o projeto {}", project_id);
        Ok(ContractDraft { contract })
    }

    pub async fn render_pdf(
        &self,
        conn: &mut PgConnection,
        policy: &EntitlementPolicy,
        user_id: Uuid,
        project_id: Uuid,
        payload: ContractPdfPayload,
    ) -> Result<ContractPdf, AppError> {
        policy.check_feature(Feature::ContractGeneration)?;
        payload.validate()?;

        let project = self.project(&mut *conn, user_id, project_id).await?;
        let filename = contract_filename(&project.title);

        // genpdf é síncrono e pesado: fora do runtime
        let documents = self.documents.clone();
        let title = project.title;
        let bytes = tokio::task::spawn_blocking(move || documents.render_contract_pdf(&title, &payload.contract))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização do PDF: {}", e))??;

        Ok(ContractPdf { filename, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::finance_service::fixtures;
    use rust_decimal::Decimal;

    #[test]
    fn request_carries_customer_and_assigned_team() {
        let project = fixtures::project("Villa", 500_000, 0, 0);
        let customer = Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Mehmet Demir".to_string(),
            phone: Some("0555".to_string()),
            address: Some("İzmir".to_string()),
            notes: Some("interno".to_string()),
            total_receivable: None,
            total_paid: None,
            created_at: None,
            updated_at: None,
        };
        let team = vec![fixtures::member("Ahmet")];

        let request = contract_request(&project, Some(&customer), &team);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["project"]["title"], "Villa");
        assert_eq!(body["project"]["startDate"], "2025-01-01");
        assert_eq!(body["customer"]["address"], "İzmir");
        assert!(body["customer"].get("notes").is_none());
        assert_eq!(body["teamMembers"][0]["daily_wage"], serde_json::json!(Decimal::from(1500)));
    }

    #[test]
    fn request_without_customer_sends_null() {
        let project = fixtures::project("Ofis", 1, 1, 1);
        let body = serde_json::to_value(contract_request(&project, None, &[])).unwrap();
        assert!(body["customer"].is_null());
        assert_eq!(body["teamMembers"].as_array().map(Vec::len), Some(0));
    }
}
