//! API Dispatcher - the single path from a tool call to the upstream API.
//!
//! The dispatcher owns one `reqwest::Client` (and therefore one connection
//! pool) plus the immutable connection table. It is built once at startup
//! and shared by `Arc` with every tool route; concurrent calls need no
//! locking.
//!
//! ## Result contract
//!
//! [`ApiDispatcher::dispatch`] returns a tagged [`ApiResult`]. The framework
//! boundary turns it into a string with [`ApiDispatcher::call`]: the raw
//! upstream body on success, `{"error": "<message>"}` on any failure.

use reqwest::Client;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, instrument};

use super::auth::{AuthHeaders, build_headers, headers_for};
use super::connection::{ConnectionRegistry, DEFAULT_CONNECTION};
use super::error::ApiError;

/// Named request parameters, in insertion order.
///
/// `GET` sends them as the query string, `POST` as the JSON body.
pub type ApiParams = serde_json::Map<String, Value>;

/// Outcome of one upstream call: the raw body or a normalized error.
pub type ApiResult = Result<String, ApiError>;

/// HTTP methods the dispatcher knows how to shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl FromStr for ApiMethod {
    type Err = ApiError;

    /// Method names are matched exactly; `get` is not `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            other => Err(ApiError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Dispatches tool requests to the configured upstream connections.
#[derive(Debug, Clone)]
pub struct ApiDispatcher {
    client: Client,
    connections: ConnectionRegistry,
    timeout: Duration,
}

impl ApiDispatcher {
    /// Per-call timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a dispatcher owning a fresh HTTP client.
    pub fn new(connections: ConnectionRegistry, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            connections,
            timeout,
        })
    }

    /// The connection table this dispatcher resolves names against.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// The fixed per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Call the upstream and render the outcome as a string.
    ///
    /// Never fails: errors come back as `{"error": "<message>"}`.
    pub async fn call(
        &self,
        method: &str,
        endpoint: &str,
        connection_name: &str,
        params: ApiParams,
    ) -> String {
        match self.dispatch(method, endpoint, connection_name, params).await {
            Ok(body) => body,
            Err(e) => e.to_envelope(),
        }
    }

    /// Call the upstream and return the tagged result.
    ///
    /// Unsupported methods are rejected before any I/O. Every other failure
    /// is logged once here.
    #[instrument(skip_all, fields(method = %method, endpoint = %endpoint, connection = %connection_name))]
    pub async fn dispatch(
        &self,
        method: &str,
        endpoint: &str,
        connection_name: &str,
        params: ApiParams,
    ) -> ApiResult {
        let method: ApiMethod = method.parse()?;

        let result = self.send(method, endpoint, connection_name, &params).await;
        if let Err(e) = &result {
            error!("API call failed: {}", e);
        }
        result
    }

    async fn send(
        &self,
        method: ApiMethod,
        endpoint: &str,
        connection_name: &str,
        params: &ApiParams,
    ) -> ApiResult {
        let (base_url, headers) = self.resolve(connection_name)?;
        let url = format!("{}{}", base_url, endpoint);

        let mut request = match method {
            ApiMethod::Get => self.client.get(&url).query(&query_pairs(params)),
            ApiMethod::Post => self.client.post(&url).json(params),
        };
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Resolve a connection name to a base URL and its auth headers.
    ///
    /// An unconfigured name falls back to the default connection's base URL
    /// without any authentication.
    fn resolve(&self, connection_name: &str) -> Result<(&str, AuthHeaders), ApiError> {
        if let Some(connection) = self.connections.lookup(connection_name) {
            return Ok((connection.base_url.as_str(), build_headers(connection)));
        }

        let fallback = self
            .connections
            .lookup(DEFAULT_CONNECTION)
            .ok_or_else(|| ApiError::UnknownConnection(connection_name.to_string()))?;
        Ok((fallback.base_url.as_str(), headers_for(None)))
    }
}

/// Flatten params into query pairs. Strings go out unquoted, null as empty.
fn query_pairs(params: &ApiParams) -> Vec<(&str, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.as_str(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::api::{AuthType, Connection};
    use crate::test_support::LogCapture;
    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, Method, StatusCode, Uri},
        routing::{any, get},
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    async fn spawn_upstream(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn echo_handler(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(serde_json::json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "authorization": header("authorization"),
            "x_api_key": header("x-api-key"),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    fn dispatcher_for(connections: Vec<Connection>) -> ApiDispatcher {
        ApiDispatcher::new(
            ConnectionRegistry::new(connections),
            ApiDispatcher::DEFAULT_TIMEOUT,
        )
        .unwrap()
    }

    fn echo_json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("GET".parse::<ApiMethod>(), Ok(ApiMethod::Get));
        assert_eq!("POST".parse::<ApiMethod>(), Ok(ApiMethod::Post));
        assert_eq!(
            "get".parse::<ApiMethod>(),
            Err(ApiError::UnsupportedMethod("get".to_string()))
        );
    }

    #[test]
    fn test_query_pairs_flatten_scalars() {
        let mut params = ApiParams::new();
        params.insert("q".into(), Value::from("milk"));
        params.insert("limit".into(), Value::from(5));
        params.insert("done".into(), Value::from(false));
        params.insert("none".into(), Value::Null);

        assert_eq!(
            query_pairs(&params),
            vec![
                ("q", "milk".to_string()),
                ("limit", "5".to_string()),
                ("done", "false".to_string()),
                ("none", String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unsupported_method_makes_no_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/{*path}",
            any(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "[]"
                }
            }),
        );
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        for method in ["DELETE", "PUT", "PATCH", "get", ""] {
            let result = dispatcher
                .call(method, "/todos", DEFAULT_CONNECTION, ApiParams::new())
                .await;
            let expected = serde_json::json!({ "error": format!("Unsupported method: {}", method) });
            assert_eq!(echo_json(&result), expected);
        }

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_body_returned_verbatim() {
        let app = Router::new().route("/numbers", get(|| async { "[1,2,3]" }));
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        let result = dispatcher
            .call("GET", "/numbers", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        assert_eq!(result, "[1,2,3]");
    }

    #[tokio::test]
    async fn test_error_status_becomes_envelope() {
        let app = Router::new()
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        for endpoint in ["/missing", "/broken"] {
            let tagged = dispatcher
                .dispatch("GET", endpoint, DEFAULT_CONNECTION, ApiParams::new())
                .await;
            assert!(matches!(tagged, Err(ApiError::Status(_))));

            let result = dispatcher
                .call("GET", endpoint, DEFAULT_CONNECTION, ApiParams::new())
                .await;
            let envelope = echo_json(&result);
            let message = envelope["error"].as_str().unwrap();
            assert!(!message.is_empty());
            assert_eq!(envelope.as_object().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_get_sends_query_and_no_body() {
        let app = Router::new().route("/{*path}", any(echo_handler));
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        let mut params = ApiParams::new();
        params.insert("userId".into(), Value::from(1));
        params.insert("q".into(), Value::from("a b"));

        let result = dispatcher
            .call("GET", "/todos", DEFAULT_CONNECTION, params)
            .await;
        let echo = echo_json(&result);

        assert_eq!(echo["method"], "GET");
        assert_eq!(echo["path"], "/todos");
        assert_eq!(echo["query"], "userId=1&q=a+b");
        assert_eq!(echo["body"], "");
    }

    #[tokio::test]
    async fn test_post_sends_json_body_and_no_query() {
        let app = Router::new().route("/{*path}", any(echo_handler));
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        let mut params = ApiParams::new();
        params.insert("title".into(), Value::from("Buy milk"));
        params.insert("completed".into(), Value::from(false));

        let result = dispatcher
            .call("POST", "/todos", DEFAULT_CONNECTION, params)
            .await;
        let echo = echo_json(&result);

        assert_eq!(echo["method"], "POST");
        assert_eq!(echo["query"], Value::Null);
        assert_eq!(
            echo_json(echo["body"].as_str().unwrap()),
            serde_json::json!({ "title": "Buy milk", "completed": false })
        );
    }

    #[tokio::test]
    async fn test_auth_headers_are_attached() {
        let app = Router::new().route("/{*path}", any(echo_handler));
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![
            Connection::new("bearer", base_url.clone())
                .with_auth(AuthType::Bearer)
                .with_auth_field("token", "t0k3n"),
            Connection::new("keyed", base_url)
                .with_auth(AuthType::ApiKey)
                .with_auth_field("api_key", "k3y"),
        ]);

        let echo = echo_json(&dispatcher.call("GET", "/x", "bearer", ApiParams::new()).await);
        assert_eq!(echo["authorization"], "Bearer t0k3n");
        assert_eq!(echo["x_api_key"], Value::Null);

        let echo = echo_json(&dispatcher.call("GET", "/x", "keyed", ApiParams::new()).await);
        assert_eq!(echo["authorization"], Value::Null);
        assert_eq!(echo["x_api_key"], "k3y");
    }

    #[tokio::test]
    async fn test_unconfigured_connection_proceeds_unauthenticated() {
        let app = Router::new().route("/{*path}", any(echo_handler));
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![
            Connection::new(DEFAULT_CONNECTION, base_url)
                .with_auth(AuthType::Bearer)
                .with_auth_field("token", "secret"),
        ]);

        let result = dispatcher
            .dispatch("GET", "/todos", "not-configured", ApiParams::new())
            .await;
        let echo = echo_json(&result.unwrap());

        assert_eq!(echo["path"], "/todos");
        assert_eq!(echo["authorization"], Value::Null);
    }

    #[test]
    fn test_unknown_connection_without_default() {
        let dispatcher = dispatcher_for(vec![Connection::new("other", "http://127.0.0.1:1")]);

        let result = tokio_test::block_on(dispatcher.dispatch(
            "GET",
            "/todos",
            "missing",
            ApiParams::new(),
        ));
        assert_eq!(
            result,
            Err(ApiError::UnknownConnection("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_envelope() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher =
            dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, format!("http://{addr}"))]);
        let result = dispatcher
            .dispatch("GET", "/todos", DEFAULT_CONNECTION, ApiParams::new())
            .await;

        match result {
            Err(ApiError::Transport(message)) => {
                assert!(message.to_lowercase().contains("refused"), "{message}");
            }
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_becomes_envelope() {
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, "not a url")]);

        let result = dispatcher
            .call("GET", "/todos", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        let message = echo_json(&result)["error"].as_str().unwrap().to_string();
        assert!(message.contains("relative URL without a base"), "{message}");
    }

    #[tokio::test]
    async fn test_timeout_becomes_envelope() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let base_url = spawn_upstream(app).await;
        let dispatcher = ApiDispatcher::new(
            ConnectionRegistry::new([Connection::new(DEFAULT_CONNECTION, base_url)]),
            Duration::from_millis(100),
        )
        .unwrap();

        let result = dispatcher
            .dispatch("GET", "/slow", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        match result {
            Err(ApiError::Transport(message)) => {
                assert!(message.contains("timed out"), "{message}");
            }
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_logged_once_success_not_logged() {
        let app = Router::new()
            .route("/ok", get(|| async { "[]" }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let base_url = spawn_upstream(app).await;
        let dispatcher = dispatcher_for(vec![Connection::new(DEFAULT_CONNECTION, base_url)]);

        let logs = LogCapture::start();

        dispatcher
            .call("GET", "/ok", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        dispatcher
            .call("DELETE", "/ok", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        assert!(logs.lines_containing("API call failed").is_empty());

        dispatcher
            .call("GET", "/broken", DEFAULT_CONNECTION, ApiParams::new())
            .await;
        let failures = logs.lines_containing("API call failed");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("ERROR"));
        assert!(failures[0].contains("500"));
    }
}
