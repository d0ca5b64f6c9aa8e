use crate::connection::DbPool;
use crate::repositories::RepositoryError;
use sqlx::Executor;

const SEED_CUSTOMER_IDS: &[i64] = &[1, 2, 3, 4, 5, 6, 7, 8];
const SEED_TICKET_IDS: &[i64] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Active customers that hold at least one open ticket in the seed. The
/// multi-intent "active customers with open tickets" scenario reports exactly
/// these.
pub const ACTIVE_WITH_OPEN_TICKETS: &[i64] = &[1, 2, 7, 8];

/// Deterministic demo dataset: eight customers and ten tickets.
pub struct SeedDataset;

impl SeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/helpdesk_seed.sql");

    /// Load the seed inside one transaction. Rows are replaced by id, so
    /// loading twice leaves the same data behind.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            customers_seeded: SEED_CUSTOMER_IDS.len(),
            tickets_seeded: SEED_TICKET_IDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let customers = count_ids(pool, "customers", SEED_CUSTOMER_IDS).await?;
        checks.push(("seed-customers", customers == SEED_CUSTOMER_IDS.len() as i64));

        let tickets = count_ids(pool, "tickets", SEED_TICKET_IDS).await?;
        checks.push(("seed-tickets", tickets == SEED_TICKET_IDS.len() as i64));

        let active_with_open: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT c.id FROM customers c JOIN tickets t ON t.customer_id = c.id \
             WHERE c.status = 'active' AND t.status = 'open' ORDER BY c.id",
        )
        .fetch_all(pool)
        .await?;
        checks.push(("active-with-open-tickets", active_with_open == ACTIVE_WITH_OPEN_TICKETS));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Remove the seeded rows. Tickets go with their customers.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        let ids = sql_array_from_ids(SEED_CUSTOMER_IDS);
        sqlx::query(&format!("DELETE FROM tickets WHERE customer_id IN {ids}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM customers WHERE id IN {ids}")).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn count_ids(pool: &DbPool, table: &str, ids: &[i64]) -> Result<i64, RepositoryError> {
    let count = sqlx::query_scalar(&format!(
        "SELECT COUNT(1) FROM {table} WHERE id IN {}",
        sql_array_from_ids(ids)
    ))
    .fetch_one(pool)
    .await?;
    Ok(count)
}

fn sql_array_from_ids(ids: &[i64]) -> String {
    let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
    format!("({joined})")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub customers_seeded: usize,
    pub tickets_seeded: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(label, _)| *label).collect()
    }
}
