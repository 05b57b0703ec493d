//! Tool Router - builds the rmcp ToolRouter.
//!
//! The router serves the rmcp transports (STDIO and streamable HTTP). It
//! delegates to the tool definitions themselves; each tool knows how to
//! create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::domains::api::ApiDispatcher;

use super::definitions::{CreateTodoTool, GetTodoTool, GetTodosTool};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(dispatcher: Arc<ApiDispatcher>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(GetTodosTool::create_route(dispatcher.clone()))
        .with_route(GetTodoTool::create_route(dispatcher.clone()))
        .with_route(CreateTodoTool::create_route(dispatcher))
}
