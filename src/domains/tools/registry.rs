//! Tool Registry - central registration and dispatch for all tools.
//!
//! Dispatches HTTP JSON-RPC tool calls by name.

use std::sync::Arc;
use tracing::warn;

use crate::domains::api::ApiDispatcher;

use super::definitions::{CreateTodoTool, GetTodoTool, GetTodosTool};

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    dispatcher: Arc<ApiDispatcher>,
}

impl ToolRegistry {
    /// Create a new tool registry backed by the given dispatcher.
    pub fn new(dispatcher: Arc<ApiDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let dispatcher = self.dispatcher.clone();
        match name {
            GetTodosTool::NAME => GetTodosTool::http_handler(arguments, dispatcher).await,
            GetTodoTool::NAME => GetTodoTool::http_handler(arguments, dispatcher).await,
            CreateTodoTool::NAME => CreateTodoTool::http_handler(arguments, dispatcher).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(super::ToolError::not_found(name).to_string())
            }
        }
    }
}
