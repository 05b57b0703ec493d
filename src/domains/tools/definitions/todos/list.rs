//! List todos tool definition.
//!
//! Fetches the whole `/todos` collection and returns the first `limit`
//! entries.
//!
//! A dispatcher error envelope is returned unchanged. A successful body that
//! is not a JSON array is reported as a new error envelope rather than
//! truncated.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{TODOS_ENDPOINT, default_limit, to_call_result};
use crate::domains::api::{ApiDispatcher, ApiError, ApiParams, ApiResult, DEFAULT_CONNECTION};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the list todos tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTodosParams {
    /// Maximum number of todos to return.
    #[schemars(description = "Maximum number of todos to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// List todos tool.
pub struct GetTodosTool;

impl GetTodosTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_todos";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "List todo items. Returns a JSON array holding at most `limit` todos (default 10), in upstream order.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(limit = params.limit))]
    pub async fn execute(params: &GetTodosParams, dispatcher: &ApiDispatcher) -> ApiResult {
        info!("Listing up to {} todos", params.limit);

        let body = dispatcher
            .dispatch("GET", TODOS_ENDPOINT, DEFAULT_CONNECTION, ApiParams::new())
            .await?;

        truncate_array(&body, params.limit)
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: Value,
        dispatcher: Arc<ApiDispatcher>,
    ) -> Result<Value, String> {
        let params: GetTodosParams = super::common::parse_arguments(arguments)?;

        info!("List todos tool (HTTP) called");

        let result = to_call_result(Self::execute(&params, &dispatcher).await);
        Ok(super::common::call_result_to_json(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTodosParams>(),
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
                let params: GetTodosParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                let result: CallToolResult =
                    to_call_result(Self::execute(&params, &dispatcher).await);
                Ok(result)
            }
            .boxed()
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Keep the first `limit` elements of a JSON array body.
fn truncate_array(body: &str, limit: usize) -> ApiResult {
    let items: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| ApiError::unexpected_shape(format!("expected a JSON array: {}", e)))?;

    let kept: Vec<Value> = items.into_iter().take(limit).collect();
    serde_json::to_string(&kept).map_err(|e| ApiError::unexpected_shape(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::todos::common::test_support::{
        dispatcher_for, text_of,
    };
    use axum::{Router, http::StatusCode, routing::get};

    #[test]
    fn test_params_default_limit() {
        let params: GetTodosParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn test_truncate_array_keeps_prefix() {
        assert_eq!(
            truncate_array(r#"[{"id":1},{"id":2},{"id":3}]"#, 2).unwrap(),
            r#"[{"id":1},{"id":2}]"#
        );
        assert_eq!(truncate_array("[1,2]", 10).unwrap(), "[1,2]");
        assert_eq!(truncate_array("[1,2]", 0).unwrap(), "[]");
    }

    #[test]
    fn test_truncate_array_rejects_non_array() {
        let err = truncate_array(r#"{"id":1}"#, 2).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedShape(_)));
        assert!(err.to_string().starts_with("Unexpected response shape"));
    }

    #[tokio::test]
    async fn test_get_todos_truncates_to_limit() {
        let app = Router::new().route(
            "/todos",
            get(|| async { r#"[{"id":1},{"id":2},{"id":3}]"# }),
        );
        let dispatcher = dispatcher_for(app).await;

        let params = GetTodosParams { limit: 2 };
        let result = GetTodosTool::execute(&params, &dispatcher).await;

        let todos: Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(todos, serde_json::json!([{"id": 1}, {"id": 2}]));
    }

    #[tokio::test]
    async fn test_get_todos_passes_error_envelope_through() {
        let app = Router::new().route(
            "/todos",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let dispatcher = dispatcher_for(app).await;

        let direct = dispatcher
            .call("GET", TODOS_ENDPOINT, DEFAULT_CONNECTION, ApiParams::new())
            .await;

        let params = GetTodosParams { limit: 2 };
        let result = to_call_result(GetTodosTool::execute(&params, &dispatcher).await);

        assert!(result.is_error.unwrap_or(false));
        assert_eq!(text_of(&result), direct);
    }

    #[tokio::test]
    async fn test_get_todos_reports_unexpected_shape() {
        let app = Router::new().route("/todos", get(|| async { r#"{"id":1}"# }));
        let dispatcher = dispatcher_for(app).await;

        let params = GetTodosParams { limit: 2 };
        let result = to_call_result(GetTodosTool::execute(&params, &dispatcher).await);

        assert!(result.is_error.unwrap_or(false));
        let envelope: Value = serde_json::from_str(text_of(&result)).unwrap();
        assert!(
            envelope["error"]
                .as_str()
                .unwrap()
                .starts_with("Unexpected response shape")
        );
    }

    #[test]
    fn test_to_tool_metadata() {
        let tool = GetTodosTool::to_tool();
        assert_eq!(tool.name, "get_todos");
        assert!(tool.input_schema.contains_key("properties"));
    }
}
