//! Infrastructure layer: SQLite store and DI container
//!
//! This layer implements the store boundary trait and wires up services.

pub mod di;
pub mod error;
pub mod schema;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use store::{OpenMode, SqliteStore};
