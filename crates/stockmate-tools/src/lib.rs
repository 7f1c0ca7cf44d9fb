//! Tool management and execution framework for StockMate
//!
//! This crate provides the [`Tool`] trait implemented by every callable tool
//! and the [`ToolRegistry`] the protocol host dispatches through.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Result, ToolError};
pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
