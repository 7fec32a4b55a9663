// src/services/subscription/plans.rs

use rust_decimal::Decimal;

use crate::{
    common::{
        currency::{format_currency_in, CurrencyLocale},
        i18n::I18nStore,
    },
    models::subscription::{PlanInfo, PlanLimits, SubscriptionTier},
};

// Preço do Premium, cobrado em liras (TRY)
const PREMIUM_PRICE_CENTS: i64 = 4999;
const PLAN_CURRENCY: CurrencyLocale = CurrencyLocale::Turkish;

pub struct PlanIds<'a> {
    pub premium_product_id: &'a str,
    pub premium_price_id: &'a str,
}

fn limited_feature(i18n: &I18nStore, lang: &str, key: &str, limit: u32) -> String {
    i18n.translate_with(lang, key, &[("limit", limit.to_string())])
}

/// Catálogo dos planos para a tela de upgrade, no idioma do cliente.
pub fn plan_catalog(limits: &PlanLimits, ids: &PlanIds<'_>, i18n: &I18nStore, lang: &str) -> Vec<PlanInfo> {
    let mut standard_features = Vec::new();
    if let Some(max) = limits.standard.max_projects {
        standard_features.push(limited_feature(i18n, lang, "plan.feature.projects_limited", max));
    }
    if let Some(max) = limits.standard.max_team_members {
        standard_features.push(limited_feature(i18n, lang, "plan.feature.team_limited", max));
    }
    standard_features.push(i18n.translate(lang, "plan.feature.basic_reports"));
    standard_features.push(i18n.translate(lang, "plan.feature.email_support"));

    let premium_features = [
        "plan.feature.projects_unlimited",
        "plan.feature.team_unlimited",
        "plan.feature.advanced_reports",
        "plan.feature.priority_support",
        "plan.feature.ai_materials",
    ]
    .iter()
    .map(|key| i18n.translate(lang, key))
    .collect();

    let premium_price = Decimal::new(PREMIUM_PRICE_CENTS, 2);

    vec![
        PlanInfo {
            tier: SubscriptionTier::Standard,
            name: i18n.translate(lang, "plan.standard.name"),
            product_id: None,
            price_id: None,
            price: Decimal::ZERO,
            currency: PLAN_CURRENCY.currency_code().to_string(),
            formatted_price: format_currency_in(Decimal::ZERO, PLAN_CURRENCY),
            limits: limits.standard,
            features: standard_features,
        },
        PlanInfo {
            tier: SubscriptionTier::Premium,
            name: i18n.translate(lang, "plan.premium.name"),
            product_id: Some(ids.premium_product_id.to_string()),
            price_id: Some(ids.premium_price_id.to_string()),
            price: premium_price,
            currency: PLAN_CURRENCY.currency_code().to_string(),
            formatted_price: format_currency_in(premium_price, PLAN_CURRENCY),
            limits: limits.premium,
            features: premium_features,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::{PREMIUM_PRICE_ID, PREMIUM_PRODUCT_ID};

    fn catalog(limits: PlanLimits, lang: &str) -> Vec<PlanInfo> {
        let i18n = I18nStore::load().unwrap();
        let ids = PlanIds {
            premium_product_id: PREMIUM_PRODUCT_ID,
            premium_price_id: PREMIUM_PRICE_ID,
        };
        plan_catalog(&limits, &ids, &i18n, lang)
    }

    #[test]
    fn premium_is_priced_in_lira() {
        let plans = catalog(PlanLimits::default(), "en");
        let premium = &plans[1];

        assert_eq!(premium.price, Decimal::new(4999, 2));
        assert_eq!(premium.currency, "TRY");
        assert_eq!(premium.formatted_price, "₺50");
        assert_eq!(premium.price_id.as_deref(), Some(PREMIUM_PRICE_ID));
        assert_eq!(premium.features.len(), 5);
        assert_eq!(plans[0].formatted_price, "₺0");
    }

    #[test]
    fn standard_features_follow_the_configured_limits() {
        let plans = catalog(PlanLimits::default(), "tr");
        assert_eq!(plans[0].features[0], "3 proje");
        assert_eq!(plans[0].features[1], "2 ekip üyesi");
        assert_eq!(plans[0].limits.max_photos_per_project, 2);

        let relaxed = catalog(PlanLimits::with_standard_photo_cap(4), "en");
        assert_eq!(relaxed[0].limits.max_photos_per_project, 4);
    }
}
