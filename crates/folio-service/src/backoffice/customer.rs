//! Customer rules: required fields, unique email, no delete while ordering.

use tracing::info;

use folio_core::search::CustomerCriteria;
use folio_core::validation::validate_customer;
use folio_core::{Customer, EntityId, ValidationError};
use folio_store::StoreError;

use super::Backoffice;
use crate::error::ServiceResult;

impl Backoffice {
    /// Registers a customer.
    ///
    /// ## Errors
    /// - `Validation(Required)` for a blank name or email
    /// - `Validation(Duplicate)` when the email is already registered
    pub fn create_customer(&self, customer: Customer) -> ServiceResult<Customer> {
        validate_customer(&customer)?;

        let _guard = self.lock_inventory();
        if self.catalog.customers.email_taken(&customer.email, None) {
            return Err(ValidationError::duplicate("email", customer.email).into());
        }

        let customer = self.catalog.customers.create(customer)?;
        info!(customer_id = customer.id, "Customer created");
        self.persist_customers()?;
        Ok(customer)
    }

    /// Replaces a customer. The email may stay the same; it may not collide
    /// with another customer's.
    pub fn update_customer(&self, id: EntityId, customer: Customer) -> ServiceResult<Customer> {
        validate_customer(&customer)?;

        let _guard = self.lock_inventory();
        if !self.catalog.customers.contains(id) {
            return Err(StoreError::not_found("Customer", id).into());
        }
        if self.catalog.customers.email_taken(&customer.email, Some(id)) {
            return Err(ValidationError::duplicate("email", customer.email).into());
        }

        let customer = self.catalog.customers.update(id, customer)?;
        info!(customer_id = id, "Customer updated");
        self.persist_customers()?;
        Ok(customer)
    }

    /// Deletes a customer with no orders.
    pub fn delete_customer(&self, id: EntityId) -> ServiceResult<Customer> {
        let _guard = self.lock_inventory();
        if !self.catalog.customers.contains(id) {
            return Err(StoreError::not_found("Customer", id).into());
        }
        if self.catalog.orders.references_customer(id) {
            return Err(StoreError::conflict("Customer", id, "customer has orders").into());
        }

        let customer = self.catalog.customers.delete(id)?;
        info!(customer_id = id, "Customer deleted");
        self.persist_customers()?;
        Ok(customer)
    }

    pub fn get_customer(&self, id: EntityId) -> ServiceResult<Customer> {
        Ok(self.catalog.customers.get(id)?)
    }

    pub fn list_customers(&self) -> Vec<Customer> {
        self.catalog.customers.get_all()
    }

    pub fn search_customers(&self, criteria: &CustomerCriteria) -> ServiceResult<Vec<Customer>> {
        Ok(self.catalog.customers.search(criteria)?)
    }
}
