//! Core types shared across the Giralibros crates: configuration, the unified
//! error type, and the domain models.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
