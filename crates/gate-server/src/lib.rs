//! HTTP surface for growers-gate
//!
//! This crate provides:
//! - The `/healthz` and `/db-test` routes
//! - Typed application errors rendered as `{"detail", "type"}` JSON
//! - The error layer that redacts and logs every error response

pub mod error;
pub mod handlers;
pub mod report;
pub mod server;

pub use error::{AppError, ErrorReport};
pub use server::{AppState, router, routes, serve, with_layers};
