// src/services/entitlement.rs
//
// Política de planos: decide o que o usuário pode criar e o que fica bloqueado.
// `EntitlementPolicy` é pura; só `EntitlementService` lê as contagens do banco.

use serde::Serialize;
use sqlx::PgConnection;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProjectRepository, TeamRepository},
    models::subscription::{Feature, LimitedResource, PlanLimits, SubscriptionTier, TierLimits},
};

/// Administradores contam como Premium, independente do billing.
/// Único ponto a mudar se essa regra deixar de valer.
pub fn admin_overrides_billing(is_admin: bool) -> bool {
    is_admin
}

/// Quantos recursos a conta já tem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub projects: i64,
    pub team_members: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct EntitlementPolicy {
    subscribed: bool,
    is_admin: bool,
    counts: ResourceCounts,
    limits: PlanLimits,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    pub has_premium_access: bool,
    pub effective_tier: SubscriptionTier,
    pub is_admin: bool,
    pub subscribed: bool,
    pub project_count: i64,
    pub project_limit: Option<u32>,
    pub team_member_count: i64,
    pub team_member_limit: Option<u32>,
    pub can_create_project: bool,
    pub can_create_team_member: bool,
    pub max_photos_per_project: u32,
    pub reports_locked: bool,
    pub contracts_locked: bool,
    pub material_suggestions_locked: bool,
}

fn within_limit(current: i64, limit: Option<u32>) -> bool {
    match limit {
        Some(limit) => current < i64::from(limit),
        None => true,
    }
}

impl EntitlementPolicy {
    /// `subscribed` já deve ser "assinante do produto Premium";
    /// estado desconhecido ou com erro chega aqui como `false`.
    pub fn new(subscribed: bool, is_admin: bool, counts: ResourceCounts, limits: PlanLimits) -> Self {
        Self { subscribed, is_admin, counts, limits }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn has_premium_access(&self) -> bool {
        self.subscribed || admin_overrides_billing(self.is_admin)
    }

    pub fn effective_tier(&self) -> SubscriptionTier {
        if self.has_premium_access() {
            SubscriptionTier::Premium
        } else {
            SubscriptionTier::Standard
        }
    }

    fn tier_limits(&self) -> &TierLimits {
        self.limits.for_tier(self.effective_tier())
    }

    pub fn can_create_project(&self) -> bool {
        within_limit(self.counts.projects, self.tier_limits().max_projects)
    }

    pub fn can_create_team_member(&self) -> bool {
        within_limit(self.counts.team_members, self.tier_limits().max_team_members)
    }

    pub fn max_photos_allowed(&self) -> u32 {
        self.tier_limits().max_photos_per_project
    }

    pub fn can_add_photo(&self, current_photo_count: usize) -> bool {
        current_photo_count < self.max_photos_allowed() as usize
    }

    pub fn is_report_section_locked(&self) -> bool {
        !self.has_premium_access()
    }

    pub fn is_contract_generation_locked(&self) -> bool {
        !self.has_premium_access()
    }

    pub fn is_material_suggestion_locked(&self) -> bool {
        !self.has_premium_access()
    }

    pub fn is_feature_locked(&self, feature: Feature) -> bool {
        match feature {
            Feature::AdvancedReports => self.is_report_section_locked(),
            Feature::ContractGeneration => self.is_contract_generation_locked(),
            Feature::MaterialSuggestions => self.is_material_suggestion_locked(),
        }
    }

    // --- Verificações que viram erro HTTP ---

    pub fn check_create_project(&self) -> Result<(), AppError> {
        if self.can_create_project() {
            return Ok(());
        }
        Err(AppError::PlanLimitReached {
            resource: LimitedResource::Projects,
            current: self.counts.projects,
            limit: self.tier_limits().max_projects.map(i64::from).unwrap_or_default(),
        })
    }

    pub fn check_create_team_member(&self) -> Result<(), AppError> {
        if self.can_create_team_member() {
            return Ok(());
        }
        Err(AppError::PlanLimitReached {
            resource: LimitedResource::TeamMembers,
            current: self.counts.team_members,
            limit: self.tier_limits().max_team_members.map(i64::from).unwrap_or_default(),
        })
    }

    pub fn check_add_photo(&self, current_photo_count: usize) -> Result<(), AppError> {
        if self.can_add_photo(current_photo_count) {
            return Ok(());
        }
        Err(AppError::PlanLimitReached {
            resource: LimitedResource::Photos,
            current: current_photo_count as i64,
            limit: i64::from(self.max_photos_allowed()),
        })
    }

    pub fn check_feature(&self, feature: Feature) -> Result<(), AppError> {
        if self.is_feature_locked(feature) {
            return Err(AppError::FeatureLocked(feature));
        }
        Ok(())
    }

    pub fn snapshot(&self) -> EntitlementSnapshot {
        let limits = self.tier_limits();
        EntitlementSnapshot {
            has_premium_access: self.has_premium_access(),
            effective_tier: self.effective_tier(),
            is_admin: self.is_admin,
            subscribed: self.subscribed,
            project_count: self.counts.projects,
            project_limit: limits.max_projects,
            team_member_count: self.counts.team_members,
            team_member_limit: limits.max_team_members,
            can_create_project: self.can_create_project(),
            can_create_team_member: self.can_create_team_member(),
            max_photos_per_project: self.max_photos_allowed(),
            reports_locked: self.is_report_section_locked(),
            contracts_locked: self.is_contract_generation_locked(),
            material_suggestions_locked: self.is_material_suggestion_locked(),
        }
    }
}

// =============================================================================
//  CONTAGENS (entrada da política, lidas do banco a cada requisição)
// =============================================================================

#[derive(Clone)]
pub struct EntitlementService {
    project_repo: ProjectRepository,
    team_repo: TeamRepository,
}

impl EntitlementService {
    pub fn new(project_repo: ProjectRepository, team_repo: TeamRepository) -> Self {
        Self { project_repo, team_repo }
    }

    pub async fn counts(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<ResourceCounts, AppError> {
        let projects = self.project_repo.count(&mut *conn, user_id).await?;
        let team_members = self.team_repo.count(&mut *conn, user_id).await?;
        Ok(ResourceCounts { projects, team_members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(subscribed: bool, is_admin: bool, projects: i64, team_members: i64) -> EntitlementPolicy {
        EntitlementPolicy::new(
            subscribed,
            is_admin,
            ResourceCounts { projects, team_members },
            PlanLimits::default(),
        )
    }

    #[test]
    fn standard_user_at_three_projects_is_blocked_with_current_and_limit() {
        let policy = policy(false, false, 3, 0);

        assert!(!policy.can_create_project());
        match policy.check_create_project() {
            Err(AppError::PlanLimitReached { resource, current, limit }) => {
                assert_eq!(resource, LimitedResource::Projects);
                assert_eq!(current, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("esperava PlanLimitReached, veio {:?}", other),
        }
    }

    #[test]
    fn admin_without_subscription_gets_everything() {
        let policy = policy(false, true, 10, 10);

        assert!(policy.has_premium_access());
        assert!(policy.can_create_project());
        assert!(policy.can_create_team_member());
        assert_eq!(policy.max_photos_allowed(), 4);
        assert!(!policy.is_report_section_locked());
        assert!(policy.check_feature(Feature::ContractGeneration).is_ok());
    }

    #[test]
    fn standard_user_is_limited_to_two_team_members_and_two_photos() {
        let policy = policy(false, false, 0, 2);

        assert!(!policy.can_create_team_member());
        assert_eq!(policy.max_photos_allowed(), 2);
        assert!(policy.can_add_photo(1));
        assert!(!policy.can_add_photo(2));
        assert!(matches!(
            policy.check_add_photo(2),
            Err(AppError::PlanLimitReached { resource: LimitedResource::Photos, current: 2, limit: 2 })
        ));
    }

    #[test]
    fn standard_photo_cap_is_configurable() {
        let policy = EntitlementPolicy::new(
            false,
            false,
            ResourceCounts::default(),
            PlanLimits::with_standard_photo_cap(4),
        );
        assert_eq!(policy.max_photos_allowed(), 4);
    }

    #[test]
    fn premium_features_are_locked_for_standard() {
        let policy = policy(false, false, 0, 0);

        assert!(policy.is_report_section_locked());
        assert!(policy.is_contract_generation_locked());
        assert!(policy.is_material_suggestion_locked());
        assert!(matches!(
            policy.check_feature(Feature::MaterialSuggestions),
            Err(AppError::FeatureLocked(Feature::MaterialSuggestions))
        ));

        let snapshot = policy.snapshot();
        assert_eq!(snapshot.effective_tier, SubscriptionTier::Standard);
        assert_eq!(snapshot.project_limit, Some(3));
        assert!(snapshot.reports_locked);
    }

    #[test]
    fn subscriber_snapshot_has_no_limits() {
        let snapshot = policy(true, false, 42, 17).snapshot();

        assert!(snapshot.has_premium_access);
        assert_eq!(snapshot.project_limit, None);
        assert_eq!(snapshot.team_member_limit, None);
        assert!(snapshot.can_create_project);
        assert!(!snapshot.contracts_locked);
    }

    proptest! {
        #[test]
        fn admins_can_always_create_projects(count in 0i64..10_000, subscribed in any::<bool>()) {
            prop_assert!(policy(subscribed, true, count, 0).can_create_project());
        }

        #[test]
        fn standard_accounts_follow_the_project_limit(count in 0i64..10_000) {
            prop_assert_eq!(policy(false, false, count, 0).can_create_project(), count < 3);
        }
    }
}
