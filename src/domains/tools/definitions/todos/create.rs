//! Create todo tool definition.
//!
//! Posts `{"title", "completed"}` to the collection endpoint and returns
//! whatever the upstream answers.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::Tool,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{TODOS_ENDPOINT, to_call_result};
use crate::domains::api::{ApiDispatcher, ApiParams, ApiResult, DEFAULT_CONNECTION};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the create todo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTodoParams {
    /// Title of the new todo.
    #[schemars(description = "Title of the new todo")]
    pub title: String,

    /// Whether the todo starts out completed.
    #[schemars(description = "Whether the todo is already completed (default: false)")]
    #[serde(default)]
    pub completed: bool,
}

impl CreateTodoParams {
    /// Request body, in the order the upstream documents it.
    fn to_body(&self) -> ApiParams {
        let mut body = ApiParams::new();
        body.insert("title".to_string(), Value::from(self.title.clone()));
        body.insert("completed".to_string(), Value::from(self.completed));
        body
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Create todo tool.
pub struct CreateTodoTool;

impl CreateTodoTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "create_todo";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Create a todo item with a title and an optional completion flag. Returns the created todo as reported by the upstream API.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(title = %params.title))]
    pub async fn execute(params: &CreateTodoParams, dispatcher: &ApiDispatcher) -> ApiResult {
        info!("Creating todo: {}", params.title);

        dispatcher
            .dispatch("POST", TODOS_ENDPOINT, DEFAULT_CONNECTION, params.to_body())
            .await
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: Value,
        dispatcher: Arc<ApiDispatcher>,
    ) -> Result<Value, String> {
        let params: CreateTodoParams = super::common::parse_arguments(arguments)?;

        info!("Create todo tool (HTTP) called");

        let result = to_call_result(Self::execute(&params, &dispatcher).await);
        Ok(super::common::call_result_to_json(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CreateTodoParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for the rmcp transports.
    pub fn create_route<S>(dispatcher: Arc<ApiDispatcher>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let dispatcher = dispatcher.clone();
            async move {
                let params: CreateTodoParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(to_call_result(Self::execute(&params, &dispatcher).await))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
