//! Forecast Agent MCP Server
//!
//! Model Context Protocol server exposing the forecast pipeline as tools.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
