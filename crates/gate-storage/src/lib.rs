//! Storage layer for growers-gate
//!
//! This crate provides:
//! - SQLite connection setup with a bounded connect timeout
//! - The user lookup behind the database connectivity check

pub mod db;
pub mod error;

pub use db::Database;
pub use error::{Result, StorageError};
