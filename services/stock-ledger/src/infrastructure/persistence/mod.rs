//! PostgreSQL 持久化

pub mod error_mapper;
pub mod postgres_unit_of_work;
pub mod rows;
pub mod tx_repositories;

pub use error_mapper::map_sqlx_error;
pub use postgres_unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
