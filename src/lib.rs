//! Todo List MCP Server Library
//!
//! This crate exposes a todo REST API as Model Context Protocol (MCP) tools.
//! Every tool call becomes one HTTP request to the upstream, and every
//! result is a single string: the upstream body, or `{"error": "..."}`.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **api**: connection registry, auth headers, the upstream dispatcher
//!   - **tools**: `get_todos`, `get_todo`, `create_todo`
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_mcp_server::domains::api::{ApiDispatcher, ApiParams, DEFAULT_CONNECTION};
//! use todo_mcp_server::core::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let dispatcher = ApiDispatcher::new(config.api.registry(), config.api.timeout())?;
//!     let body = dispatcher
//!         .call("GET", "/todos/1", DEFAULT_CONNECTION, ApiParams::new())
//!         .await;
//!     println!("{body}");
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
