// Base API Service Library

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod security;
pub mod services;
pub mod state;

pub use error::{AppError, Result};
pub use state::AppState;
