//! Tool Crib - Internal Tool Lending Service
//!
//! A Rust REST server for a shared tool inventory: employees request tools,
//! administrators approve, reject, or record returns, and stock counts and
//! notifications follow each request through its lifecycle.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
