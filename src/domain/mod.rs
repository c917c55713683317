//! Domain records and value objects shared by the loader, services and routes.

pub mod agency;
pub mod cliente;
pub mod criteria;
pub mod metadata;
pub mod types;
