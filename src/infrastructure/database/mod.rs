//! SQLite result cache.

pub mod connection;
pub mod run_repo;

pub use connection::DatabaseConnection;
pub use run_repo::SqliteRunRepository;
