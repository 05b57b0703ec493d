//! Tools domain module.
//!
//! Tools are the operations MCP clients can call. Every tool here forwards
//! to the upstream API through the shared
//! [`ApiDispatcher`](crate::domains::api::ApiDispatcher).
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - Dynamic ToolRouter builder for the rmcp transports
//! - `registry.rs` - Tool dispatch by name for the JSON-RPC route
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, execute(), and http_handler()
//! 3. Export in `definitions/mod.rs`
//! 4. Add route in `router.rs` using `with_route()`
//! 5. Register in `registry.rs` for the JSON-RPC route

pub mod definitions;
mod error;
#[cfg(feature = "http")]
mod registry;
pub mod router;

pub use error::ToolError;
#[cfg(feature = "http")]
pub use registry::ToolRegistry;
pub use router::build_tool_router;
