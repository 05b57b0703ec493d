//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating tool calls to the tools domain.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` method (core logic, calls the `ApiDispatcher`)
//! - `http_handler()` method (called via ToolRegistry for HTTP transport)
//!
//! The server owns the single `ApiDispatcher` and hands an `Arc` of it to
//! every tool route.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::{api::ApiDispatcher, tools::build_tool_router};

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

/// Instructions sent to clients on initialization.
pub const INSTRUCTIONS: &str = "Todo list tools backed by a REST API. Results are the upstream JSON, or an {\"error\": \"...\"} object when the call failed.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. Cloning is
/// cheap; clones share the dispatcher and its connection pool.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Upstream dispatcher shared by all tools.
    dispatcher: Arc<ApiDispatcher>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails only if the upstream HTTP client cannot be built.
    pub fn new(config: Config) -> super::error::Result<Self> {
        let config = Arc::new(config);

        let dispatcher = Arc::new(ApiDispatcher::new(
            config.api.registry(),
            config.api.timeout(),
        )?);
        info!(
            "Upstream connections: {:?} (timeout {:?})",
            dispatcher.connections().names(),
            dispatcher.timeout()
        );

        Ok(Self {
            tool_router: build_tool_router::<Self>(dispatcher.clone()),
            config,
            dispatcher,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the upstream dispatcher.
    pub fn dispatcher(&self) -> &Arc<ApiDispatcher> {
        &self.dispatcher
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.dispatcher.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
