// src/models/material.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{serde_utils::double_option, validation::non_negative};

// Unidades oferecidas no formulário. O campo continua livre (a IA pode sugerir outras).
pub const KNOWN_UNITS: [&str; 9] = ["adet", "kg", "ton", "m²", "m³", "metre", "paket", "torba", "litre"];
pub const DEFAULT_UNIT: &str = "adet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "material_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MaterialStatus {
    Planned,
    Ordered,
    Delivered,
    InUse,
}

impl Default for MaterialStatus {
    fn default() -> Self {
        MaterialStatus::Planned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    pub project_id: Uuid,

    #[schema(example = "Çimento")]
    pub name: String,

    #[schema(value_type = String, example = "100")]
    pub quantity: Decimal,

    #[schema(example = "torba")]
    pub unit: String,

    #[schema(value_type = Option<String>, example = "15000")]
    pub estimated_cost: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,

    pub status: MaterialStatus,
    pub supplier: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialTotals {
    pub count: usize,
    #[schema(value_type = String)]
    pub estimated: Decimal,
    #[schema(value_type = String)]
    pub actual: Decimal,
    pub formatted_estimated: String,
    pub formatted_actual: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialListResponse {
    pub materials: Vec<Material>,
    pub totals: MaterialTotals,
    pub known_units: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MaterialFilter {
    /// Só os materiais deste projeto
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialPayload {
    pub project_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Çimento")]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "100")]
    pub quantity: Decimal,

    #[serde(default = "default_unit")]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "torba")]
    pub unit: String,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,

    #[serde(default)]
    pub status: MaterialStatus,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// Inserção em lote (sugestões aceitas da IA).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkMaterialsPayload {
    #[validate(length(min = 1, message = "required"), nested)]
    pub materials: Vec<CreateMaterialPayload>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub quantity: Option<Decimal>,

    #[validate(length(min = 1, message = "required"))]
    pub unit: Option<String>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,

    pub status: Option<MaterialStatus>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub supplier: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,
}

impl MaterialPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.estimated_cost.is_none()
            && self.actual_cost.is_none()
            && self.status.is_none()
            && self.supplier.is_none()
            && self.notes.is_none()
    }
}

/// Item sugerido pela IA, ainda não salvo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMaterial {
    #[schema(example = "Çimento")]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = String, example = "100")]
    pub quantity: Decimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    #[schema(value_type = String, example = "15000")]
    pub estimated_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaterialSuggestionsResponse {
    pub materials: Vec<SuggestedMaterial>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_payload_validates_each_item() {
        let payload: BulkMaterialsPayload = serde_json::from_value(serde_json::json!({
            "materials": [
                { "projectId": Uuid::nil(), "name": "Çimento", "quantity": 100, "unit": "torba" },
                { "projectId": Uuid::nil(), "name": "", "quantity": -1 }
            ]
        }))
        .unwrap();

        assert!(payload.validate().is_err());
        assert_eq!(payload.materials[1].unit, DEFAULT_UNIT);
    }

    #[test]
    fn suggestion_without_cost_defaults_to_zero() {
        let item: SuggestedMaterial =
            serde_json::from_str(r#"{"name": "Kum", "quantity": 3, "unit": "m³"}"#).unwrap();
        assert_eq!(item.estimated_cost, Decimal::ZERO);
        assert!(KNOWN_UNITS.contains(&item.unit.as_str()));
    }
}
