//! Upstream API domain module.
//!
//! This module holds everything needed to talk to the upstream REST API:
//!
//! - `connection.rs` - Named connections and the read-only registry
//! - `auth.rs` - Authentication header derivation per connection
//! - `dispatcher.rs` - HTTP invocation and error normalization
//! - `error.rs` - The error taxonomy and the JSON error envelope
//!
//! Tools never build requests themselves; they go through [`ApiDispatcher`].

mod auth;
mod connection;
mod dispatcher;
mod error;

pub use auth::{AuthHeaders, build_headers, headers_for};
pub use connection::{AuthType, Connection, ConnectionRegistry, DEFAULT_BASE_URL, DEFAULT_CONNECTION};
pub use dispatcher::{ApiDispatcher, ApiMethod, ApiParams, ApiResult};
pub use error::{ApiError, error_envelope};
