//! Get todo tool definition.

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

/// Parameters for the get todo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTodoParams {
    #[schemars(description = "Identifier of the todo to fetch")]
    pub todo_id: u64,
}

/// Get todo tool - fetches a single todo by id.
pub struct GetTodoTool;

impl GetTodoTool {
    pub const NAME: &'static str = "get_todo";

    pub const DESCRIPTION: &'static str =
        "Get a single todo item by id. Returns the upstream JSON unchanged, or an {\"error\": ...} object.";

    #[instrument(skip_all, fields(todo_id = params.todo_id))]
    pub async fn execute(params: &GetTodoParams, dispatcher: &ApiDispatcher) -> ApiResult {
        info!("Fetching todo {}", params.todo_id);

        let endpoint = format!("{}/{}", TODOS_ENDPOINT, params.todo_id);
        dispatcher
            .dispatch("GET", &endpoint, DEFAULT_CONNECTION, ApiParams::new())
            .await
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: Value,
        dispatcher: Arc<ApiDispatcher>,
    ) -> Result<Value, String> {
        let params: GetTodoParams = super::common::parse_arguments(arguments)?;

        info!("Get todo tool (HTTP) called for id: {}", params.todo_id);

        let result = to_call_result(Self::execute(&params, &dispatcher).await);
        Ok(super::common::call_result_to_json(result))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTodoParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(dispatcher: Arc<ApiDispatcher>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let dispatcher = dispatcher.clone();
            async move {
                let params: GetTodoParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(to_call_result(Self::execute(&params, &dispatcher).await))
            }
            .boxed()
        })
    }
}
