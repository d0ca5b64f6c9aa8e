use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "customers",
        "tickets",
        "idx_customers_status",
        "idx_tickets_customer_id",
        "idx_tickets_created_at",
    ];

    #[tokio::test]
    async fn migrations_create_every_managed_schema_object() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        run_pending(&pool).await.expect("migrations apply");

        for object in MANAGED_SCHEMA_OBJECTS {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE name = ?")
                    .bind(object)
                    .fetch_one(&pool)
                    .await
                    .expect("schema query");
            assert_eq!(count, 1, "missing schema object `{object}`");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run is a no-op");
        pool.close().await;
    }
}
