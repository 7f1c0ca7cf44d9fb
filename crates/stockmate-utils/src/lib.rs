//! Shared utilities for StockMate
//!
//! This crate provides common functionality used across the StockMate workspace,
//! including logging setup, application configuration and environment helpers.

pub mod config;
pub mod env;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat};
pub use logging::init_tracing;
