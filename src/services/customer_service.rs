// src/services/customer_service.rs

use std::collections::HashMap;

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        currency::{format_currency_in, CurrencyLocale},
        error::AppError,
    },
    db::{CustomerRepository, ProjectRepository},
    models::customer::{CreateCustomerPayload, Customer, CustomerPatch, CustomerView},
    services::finance_service,
};

pub fn customer_views(
    customers: Vec<Customer>,
    project_counts: &HashMap<Uuid, usize>,
    locale: CurrencyLocale,
) -> Vec<CustomerView> {
    customers
        .into_iter()
        .map(|customer| {
            let balance = finance_service::balance(customer.total_receivable, customer.total_paid);
            CustomerView {
                formatted_balance: format_currency_in(balance, locale),
                balance,
                project_count: project_counts.get(&customer.id).copied().unwrap_or(0),
                customer,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    project_repo: ProjectRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, project_repo: ProjectRepository) -> Self {
        Self { repo, project_repo }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        locale: CurrencyLocale,
    ) -> Result<Vec<CustomerView>, AppError> {
        let customers = self.repo.list(&mut *conn, user_id).await?;
        let projects = self.project_repo.list(&mut *conn, user_id).await?;
        let counts = finance_service::customer_project_counts(&projects);

        Ok(customer_views(customers, &counts, locale))
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
        payload.validate()?;
        self.repo.create(executor, user_id, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        self.repo
            .update(executor, user_id, customer_id, patch)
            .await?
            .ok_or(AppError::NotFound("customer"))
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, customer_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, user_id, customer_id).await? {
            return Err(AppError::NotFound("customer"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::finance_service::fixtures;
    use rust_decimal::Decimal;

    fn customer(name: &str, receivable: i64, paid: i64) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            phone: None,
            address: None,
            notes: None,
            total_receivable: Some(Decimal::from(receivable)),
            total_paid: Some(Decimal::from(paid)),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn views_carry_balance_and_project_count() {
        let mehmet = customer("Mehmet", 250_000, 100_000);
        let ayse = customer("Ayşe", 0, 0);

        let mut villa = fixtures::project("Villa", 1, 1, 1);
        villa.customer_id = Some(mehmet.id);
        let mut ofis = fixtures::project("Ofis", 1, 1, 1);
        ofis.customer_id = Some(mehmet.id);
        let counts = finance_service::customer_project_counts(&[villa, ofis]);

        let views = customer_views(vec![mehmet, ayse], &counts, CurrencyLocale::Turkish);
        assert_eq!(views[0].balance, Decimal::from(150_000));
        assert_eq!(views[0].formatted_balance, "₺150.000");
        assert_eq!(views[0].project_count, 2);
        assert_eq!(views[1].project_count, 0);
        assert_eq!(views[1].formatted_balance, "₺0");
    }
}
