//! Authentication header derivation.

use std::collections::BTreeMap;

use super::connection::{AuthType, Connection};

/// Header name used for `api_key` auth when `key_name` is not configured.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Headers to attach to a single upstream request.
pub type AuthHeaders = BTreeMap<String, String>;

/// Build the authentication headers for a connection.
///
/// Missing config fields fall back to their defaults; an unknown auth type
/// yields no headers at all.
pub fn build_headers(connection: &Connection) -> AuthHeaders {
    let mut headers = AuthHeaders::new();

    match connection.auth_type {
        AuthType::ApiKey => {
            let name = connection
                .auth_field("key_name")
                .unwrap_or(DEFAULT_API_KEY_HEADER);
            let value = connection.auth_field("api_key").unwrap_or_default();
            headers.insert(name.to_string(), value.to_string());
        }
        AuthType::Bearer => {
            let token = connection.auth_field("token").unwrap_or_default();
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        AuthType::None | AuthType::Unknown => {}
    }

    headers
}

/// Build headers for a connection that may not be configured.
pub fn headers_for(connection: Option<&Connection>) -> AuthHeaders {
    connection.map(build_headers).unwrap_or_default()
}
