use sqlx::Row;

use helpdesk_core::domain::customer::CustomerId;
use helpdesk_core::domain::ticket::{Ticket, TicketId, OPEN_STATUS};

use super::{now_timestamp, RepositoryError, TicketRepository};
use crate::DbPool;

pub struct SqlTicketRepository {
    pool: DbPool,
}

impl SqlTicketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_ticket(row: &sqlx::sqlite::SqliteRow) -> Result<Ticket, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id: i64 =
        row.try_get("customer_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let issue: Option<String> =
        row.try_get("issue").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status: Option<String> =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let priority: Option<String> =
        row.try_get("priority").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: Option<String> =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Ticket {
        id: TicketId(id),
        customer_id: Some(CustomerId(customer_id)),
        issue,
        status,
        priority,
        created_at,
        extra: Default::default(),
    })
}

#[async_trait::async_trait]
impl TicketRepository for SqlTicketRepository {
    async fn create(
        &self,
        customer_id: CustomerId,
        issue: &str,
        priority: &str,
    ) -> Result<TicketId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tickets (customer_id, issue, status, priority, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(customer_id.0)
        .bind(issue)
        .bind(OPEN_STATUS)
        .bind(priority)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(TicketId(result.last_insert_rowid()))
    }

    async fn history(&self, customer_id: CustomerId) -> Result<Vec<Ticket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, issue, status, priority, created_at
             FROM tickets WHERE customer_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_ticket).collect()
    }
}

#[cfg(test)]
mod tests {
    use helpdesk_core::domain::customer::CustomerId;

    use crate::repositories::{SqlTicketRepository, TicketRepository};
    use crate::{connect_with_settings, migrations, SeedDataset};

    #[tokio::test]
    async fn history_is_newest_first() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        SeedDataset::load(&pool).await.expect("seed");
        let repo = SqlTicketRepository::new(pool.clone());

        let history = repo.history(CustomerId(1)).await.expect("history");
        let ids = history.iter().map(|ticket| ticket.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![8, 1]);
        assert!(history.iter().all(|ticket| ticket.customer_id == Some(CustomerId(1))));

        pool.close().await;
    }

    #[tokio::test]
    async fn created_ticket_is_open_and_appears_first_in_history() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        SeedDataset::load(&pool).await.expect("seed");
        let repo = SqlTicketRepository::new(pool.clone());

        let ticket_id = repo.create(CustomerId(5), "Upgrade request", "high").await.expect("create");
        let history = repo.history(CustomerId(5)).await.expect("history");

        assert_eq!(history.first().map(|ticket| ticket.id), Some(ticket_id));
        assert!(history[0].is_open());
        assert_eq!(history[0].priority.as_deref(), Some("high"));

        pool.close().await;
    }

    #[tokio::test]
    async fn creating_ticket_for_unknown_customer_fails() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlTicketRepository::new(pool.clone());

        assert!(repo.create(CustomerId(42), "Orphan", "low").await.is_err());
        pool.close().await;
    }
}
