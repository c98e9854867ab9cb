//! Per-repository SQLite databases: path derivation, opening, and a registry
//! that closes and reopens handles around external sync operations.

pub mod config;
pub mod error;
pub mod manager;
pub mod repo;

pub use {
    config::DatabaseConfig,
    error::{Error, Result},
    manager::DatabaseManager,
    repo::{journal_mode, open_repo_db, repo_db_exists, repo_db_path},
};
