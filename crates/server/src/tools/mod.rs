//! MCP tool implementations.
//!
//! One module per trigger or inspection tool exposed by the precache server.

pub mod cache_activate;
pub mod cache_fetch;
pub mod cache_install;
pub mod cache_keys;
pub mod client_connect;
pub mod client_disconnect;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
