use serde_json::{Map, Value};
use sqlx::Row;

use helpdesk_core::domain::customer::{Customer, CustomerId};

use super::{now_timestamp, CustomerRepository, CustomerUpdate, RepositoryError};
use crate::DbPool;

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, status, created_at, updated_at";

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode<T>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: i64 = decode(row, "id")?;
    let created_at: Option<String> = decode(row, "created_at")?;
    let updated_at: Option<String> = decode(row, "updated_at")?;

    let mut extra = Map::new();
    if let Some(created_at) = created_at {
        extra.insert("created_at".to_string(), Value::String(created_at));
    }
    if let Some(updated_at) = updated_at {
        extra.insert("updated_at".to_string(), Value::String(updated_at));
    }

    Ok(Customer {
        id: CustomerId(id),
        name: decode(row, "name")?,
        email: decode(row, "email")?,
        phone: decode(row, "phone")?,
        status: decode(row, "status")?,
        extra,
    })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_customer).transpose()
    }

    async fn list(
        &self,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE status = ? ORDER BY id LIMIT ?"
                ))
                .bind(status)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id LIMIT ?"))
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(row_to_customer).collect()
    }

    async fn update_fields(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<bool, RepositoryError> {
        update.ensure_not_empty()?;

        // Column names come from the CustomerField whitelist, never from input.
        let assignments = update
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column()))
            .chain(std::iter::once("updated_at = ?".to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE customers SET {assignments} WHERE id = ?");

        let mut query = sqlx::query(&sql);
        for (_, value) in update.iter() {
            query = query.bind(value.map(str::to_string));
        }
        let result = query.bind(now_timestamp()).bind(id.0).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
