//! Common utilities shared across the todo tools.

use rmcp::model::{CallToolResult, Content};
use tracing::warn;

use crate::domains::api::ApiResult;

/// Collection endpoint on the upstream API.
pub const TODOS_ENDPOINT: &str = "/todos";

/// Default number of todos returned by `get_todos`.
pub fn default_limit() -> usize {
    10
}

/// Convert a dispatcher result into tool output.
///
/// The text content is always the exact string the dispatcher contract
/// defines: the upstream body, or the `{"error": ...}` envelope.
pub fn to_call_result(result: ApiResult) -> CallToolResult {
    match result {
        Ok(body) => CallToolResult::success(vec![Content::text(body)]),
        Err(e) => {
            warn!("Tool call returned an error: {}", e);
            CallToolResult::error(vec![Content::text(e.to_envelope())])
        }
    }
}

/// Deserialize HTTP tool arguments into a parameter struct.
#[cfg(feature = "http")]
pub fn parse_arguments<T>(arguments: serde_json::Value) -> Result<T, String>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(arguments)
        .map_err(|e| crate::domains::tools::ToolError::invalid_arguments(e.to_string()).to_string())
}

/// Shape a tool result for the JSON-RPC HTTP transport.
#[cfg(feature = "http")]
pub fn call_result_to_json(result: CallToolResult) -> serde_json::Value {
    serde_json::json!({
        "content": result.content,
        "isError": result.is_error.unwrap_or(false)
    })
}
