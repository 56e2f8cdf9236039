//! Flashcards Server Library
//!
//! Exports the store, controllers and router for the binary and for
//! integration tests.

pub mod config;
pub mod constants;
pub mod controllers;
pub mod db;
pub mod error;
pub mod keys;
pub mod models;
pub mod routes;
pub mod security;
pub mod session;
pub mod store;

pub use config::Config;
pub use db::{Db, open_database};
pub use error::{AppError, Result};
pub use routes::router;
pub use store::Store;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given store and configuration
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }
}
