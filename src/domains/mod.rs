//! Domains module containing business logic organized by bounded contexts.
//!
//! - **api**: connections, auth headers and the upstream dispatcher
//! - **tools**: the MCP tools exposed to clients

pub mod api;
pub mod tools;
