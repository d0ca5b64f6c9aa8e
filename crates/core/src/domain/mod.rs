pub mod customer;
pub mod ticket;
