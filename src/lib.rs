//! Mealbridge — food donation coordination service.
//!
//! Library crate: everything the binary and the integration tests in
//! `tests/` share.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;

use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub config: config::Config,
}
