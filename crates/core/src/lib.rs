pub mod config;
pub mod domain;
pub mod errors;
pub mod support;

pub use domain::customer::{Customer, CustomerField, CustomerId};
pub use domain::ticket::{Ticket, TicketId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use support::{SupportDraft, SupportTopic};
