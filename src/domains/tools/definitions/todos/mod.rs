//! Todo tools module.
//!
//! Thin tools over the upstream `/todos` collection:
//! - `list`: `get_todos`, truncated to a requested limit
//! - `get`: `get_todo`, a single item by id
//! - `create`: `create_todo`, posts a new item
//!
//! Each tool has an rmcp route and a handler for the JSON-RPC route.

pub mod common;
pub mod create;
pub mod get;
pub mod list;

pub use create::{CreateTodoParams, CreateTodoTool};
pub use get::{GetTodoParams, GetTodoTool};
pub use list::{GetTodosParams, GetTodosTool};
