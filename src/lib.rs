//! Biblioteca Library Lending System
//!
//! A Rust implementation of the Biblioteca lending server, providing a REST
//! JSON API for managing a book catalog, its readers, and the loans that
//! move copies between them.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Shared handler state: configuration plus the service layer
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
