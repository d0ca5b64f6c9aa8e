use std::collections::BTreeMap;

use tokio::sync::RwLock;

use helpdesk_core::domain::customer::{Customer, CustomerField, CustomerId};
use helpdesk_core::domain::ticket::{Ticket, TicketId, OPEN_STATUS};

use super::{
    now_timestamp, CustomerRepository, CustomerUpdate, RepositoryError, TicketRepository,
};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<BTreeMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        let customers = customers.into_iter().map(|customer| (customer.id, customer)).collect();
        Self { customers: RwLock::new(customers) }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }

    async fn list(
        &self,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers
            .values()
            .filter(|customer| status.is_none() || customer.status.as_deref() == status)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_fields(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<bool, RepositoryError> {
        update.ensure_not_empty()?;

        let mut customers = self.customers.write().await;
        let Some(customer) = customers.get_mut(&id) else {
            return Ok(false);
        };

        for (field, value) in update.iter() {
            let value = value.map(str::to_string);
            match field {
                CustomerField::Name => customer.name = value,
                CustomerField::Email => customer.email = value,
                CustomerField::Phone => customer.phone = value,
                CustomerField::Status => customer.status = value,
            }
        }
        customer.extra.insert("updated_at".to_string(), now_timestamp().into());
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<Vec<Ticket>>,
}

impl InMemoryTicketRepository {
    pub fn with_tickets(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        Self { tickets: RwLock::new(tickets.into_iter().collect()) }
    }
}

#[async_trait::async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn create(
        &self,
        customer_id: CustomerId,
        issue: &str,
        priority: &str,
    ) -> Result<TicketId, RepositoryError> {
        let mut tickets = self.tickets.write().await;
        let next_id = tickets.iter().map(|ticket| ticket.id.0).max().unwrap_or(0) + 1;
        tickets.push(Ticket {
            id: TicketId(next_id),
            customer_id: Some(customer_id),
            issue: Some(issue.to_string()),
            status: Some(OPEN_STATUS.to_string()),
            priority: Some(priority.to_string()),
            created_at: Some(now_timestamp()),
            extra: Default::default(),
        });
        Ok(TicketId(next_id))
    }

    async fn history(&self, customer_id: CustomerId) -> Result<Vec<Ticket>, RepositoryError> {
        let tickets = self.tickets.read().await;
        let mut history = tickets
            .iter()
            .filter(|ticket| ticket.customer_id == Some(customer_id))
            .cloned()
            .collect::<Vec<_>>();
        history.sort_by(|left, right| {
            right.created_at.cmp(&left.created_at).then_with(|| right.id.cmp(&left.id))
        });
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use helpdesk_core::domain::customer::{Customer, CustomerField, CustomerId};
    use helpdesk_core::domain::ticket::{Ticket, TicketId};

    use crate::repositories::{
        CustomerRepository, CustomerUpdate, InMemoryCustomerRepository, InMemoryTicketRepository,
        TicketRepository,
    };

    fn customer(id: i64, status: &str) -> Customer {
        Customer { status: Some(status.to_string()), ..Customer::new(id, format!("Customer {id}")) }
    }

    fn ticket(id: i64, customer_id: i64, created_at: &str) -> Ticket {
        Ticket {
            id: TicketId(id),
            customer_id: Some(CustomerId(customer_id)),
            issue: Some(format!("Issue {id}")),
            status: Some("open".to_string()),
            priority: Some("low".to_string()),
            created_at: Some(created_at.to_string()),
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn in_memory_customer_repo_lists_in_id_order_by_status() {
        let repo = InMemoryCustomerRepository::with_customers([
            customer(3, "active"),
            customer(1, "active"),
            customer(2, "disabled"),
        ]);

        let active = repo.list(Some("active"), 10).await.expect("list");
        assert_eq!(active.iter().map(|c| c.id.0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(repo.list(None, 2).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn in_memory_customer_repo_updates_known_customer_only() {
        let repo = InMemoryCustomerRepository::with_customers([customer(1, "active")]);
        let update = CustomerUpdate::new().set(CustomerField::Email, "x@y.io");

        assert!(repo.update_fields(CustomerId(1), &update).await.expect("update"));
        assert!(!repo.update_fields(CustomerId(2), &update).await.expect("update"));

        let found = repo.find_by_id(CustomerId(1)).await.expect("find").expect("exists");
        assert_eq!(found.email.as_deref(), Some("x@y.io"));
    }

    #[tokio::test]
    async fn in_memory_ticket_repo_orders_history_newest_first() {
        let repo = InMemoryTicketRepository::with_tickets([
            ticket(1, 7, "2025-01-01T00:00:00Z"),
            ticket(2, 7, "2025-03-01T00:00:00Z"),
            ticket(3, 8, "2025-02-01T00:00:00Z"),
        ]);

        let history = repo.history(CustomerId(7)).await.expect("history");
        assert_eq!(history.iter().map(|t| t.id.0).collect::<Vec<_>>(), vec![2, 1]);

        let created = repo.create(CustomerId(7), "New", "high").await.expect("create");
        assert_eq!(created, TicketId(4));
        assert_eq!(repo.history(CustomerId(7)).await.expect("history")[0].id, created);
    }
}
