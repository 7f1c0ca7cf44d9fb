//! Model Context Protocol (MCP) server for StockMate
//!
//! This crate exposes the tools of a [`stockmate_tools::ToolRegistry`] to MCP
//! clients:
//! - JSON-RPC 2.0 framing and error codes ([`jsonrpc`])
//! - MCP message payloads for `initialize`, `tools/list` and `tools/call` ([`protocol`])
//! - Request dispatch ([`McpServer`])
//! - Newline-delimited stdio transport ([`transport`])
//!
//! # Example
//!
//! ```no_run
//! use stockmate_mcp::{McpServer, transport};
//! use stockmate_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> stockmate_mcp::Result<()> {
//! let registry = Arc::new(ToolRegistry::new());
//! let server = McpServer::new("StockMate", env!("CARGO_PKG_VERSION"), registry);
//!
//! transport::serve_stdio(&server).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod server;
pub mod transport;

pub use error::McpError;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use protocol::{Content, PROTOCOL_VERSION, ToolDefinition, ToolResult};
pub use server::McpServer;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;
