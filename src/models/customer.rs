// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{serde_utils::double_option, validation::non_negative};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    #[schema(example = "Mehmet Demir")]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,

    #[schema(value_type = Option<String>, example = "250000")]
    pub total_receivable: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "100000")]
    pub total_paid: Option<Decimal>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    #[schema(value_type = String, example = "150000")]
    pub balance: Decimal,
    #[schema(example = "₺150.000")]
    pub formatted_balance: String,
    pub project_count: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mehmet Demir")]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_receivable: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_paid: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_receivable: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub total_paid: Option<Decimal>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.notes.is_none()
            && self.total_receivable.is_none()
            && self.total_paid.is_none()
    }
}
