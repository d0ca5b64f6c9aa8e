use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer record as the record store reports it.
///
/// Columns the domain does not model are kept in `extra`, and absent optional
/// fields are skipped on serialization, so a record passes through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: CustomerId(id),
            name: Some(name.into()),
            email: None,
            phone: None,
            status: None,
            extra: Map::new(),
        }
    }
}

/// Columns a caller may change through `update_customer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    Status,
}

impl CustomerField {
    pub const ALL: [CustomerField; 4] = [Self::Name, Self::Email, Self::Phone, Self::Status];

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "status" => Ok(Self::Status),
            other => Err(DomainError::InvalidCustomerField(other.to_string())),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Status => "status",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Customer, CustomerField};
    use crate::errors::DomainError;

    #[test]
    fn partial_record_serializes_back_to_the_same_shape() {
        let raw = json!({"id": 5, "name": "Ana"});
        let customer: Customer = serde_json::from_value(raw.clone()).expect("customer decodes");

        assert_eq!(customer.id.0, 5);
        assert_eq!(customer.name.as_deref(), Some("Ana"));
        assert_eq!(serde_json::to_value(&customer).expect("customer encodes"), raw);
    }

    #[test]
    fn unknown_columns_are_preserved() {
        let raw = json!({
            "id": 2,
            "name": "Bo",
            "status": "active",
            "created_at": "2025-01-02T03:04:05Z"
        });
        let customer: Customer = serde_json::from_value(raw.clone()).expect("customer decodes");

        assert_eq!(customer.extra.get("created_at"), Some(&json!("2025-01-02T03:04:05Z")));
        assert_eq!(serde_json::to_value(&customer).expect("customer encodes"), raw);
    }

    #[test]
    fn field_parsing_is_case_insensitive_and_rejects_unknown_columns() {
        assert_eq!(CustomerField::parse("Email"), Ok(CustomerField::Email));
        assert_eq!(
            CustomerField::parse("id"),
            Err(DomainError::InvalidCustomerField("id".to_string()))
        );
    }
}
