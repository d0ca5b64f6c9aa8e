use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use helpdesk_core::domain::customer::{Customer, CustomerField, CustomerId};
use helpdesk_core::domain::ticket::{Ticket, TicketId};

pub mod customer;
pub mod memory;
pub mod ticket;

pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryTicketRepository};
pub use ticket::SqlTicketRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("validation error: {0}")]
    Validation(String),
}

/// A validated set of column changes for one customer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    fields: BTreeMap<CustomerField, Option<String>>,
}

impl CustomerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: CustomerField, value: impl Into<String>) -> Self {
        self.fields.insert(field, Some(value.into()));
        self
    }

    /// Accepts the wire shape `{"email": "...", "phone": null}`. Only the
    /// updatable columns are allowed and values must be strings or null.
    pub fn from_json(fields: &Map<String, Value>) -> Result<Self, RepositoryError> {
        let mut update = Self::new();
        for (key, value) in fields {
            let field = CustomerField::parse(key)
                .map_err(|error| RepositoryError::Validation(error.to_string()))?;
            let value = match value {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => {
                    return Err(RepositoryError::Validation(format!(
                        "customer field `{key}` must be a string or null, got {other}"
                    )))
                }
            };
            update.fields.insert(field, value);
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CustomerField, Option<&str>)> + '_ {
        self.fields.iter().map(|(field, value)| (*field, value.as_deref()))
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<(), RepositoryError> {
        if self.is_empty() {
            return Err(RepositoryError::Validation("no fields to update".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn list(
        &self,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError>;
    /// Returns whether a row changed.
    async fn update_fields(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(
        &self,
        customer_id: CustomerId,
        issue: &str,
        priority: &str,
    ) -> Result<TicketId, RepositoryError>;
    /// Newest first.
    async fn history(&self, customer_id: CustomerId) -> Result<Vec<Ticket>, RepositoryError>;
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
