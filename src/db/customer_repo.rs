// src/db/customer_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{CreateCustomerPayload, Customer, CustomerPatch},
};

const CUSTOMER_COLUMNS: &str =
    "id, user_id, name, phone, address, notes, total_receivable, total_paid, created_at, updated_at";

#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM customers WHERE user_id = $1 ORDER BY name ASC",
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(customers)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM customers WHERE id = $1 AND user_id = $2",
            CUSTOMER_COLUMNS
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &CreateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO customers (user_id, name, phone, address, notes, total_receivable, total_paid)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(&payload.name)
            .bind(&payload.phone)
            .bind(&payload.address)
            .bind(&payload.notes)
            .bind(payload.total_receivable.unwrap_or_default())
            .bind(payload.total_paid.unwrap_or_default())
            .fetch_one(executor)
            .await?;

        Ok(customer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE customers SET updated_at = NOW()");

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone.clone());
        }
        if let Some(address) = &patch.address {
            qb.push(", address = ").push_bind(address.clone());
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes.clone());
        }
        if let Some(total_receivable) = patch.total_receivable {
            qb.push(", total_receivable = ").push_bind(total_receivable);
        }
        if let Some(total_paid) = patch.total_paid {
            qb.push(", total_paid = ").push_bind(total_paid);
        }

        qb.push(" WHERE id = ").push_bind(customer_id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(CUSTOMER_COLUMNS);

        let customer = qb
            .build_query_as::<Customer>()
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, customer_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(customer_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
