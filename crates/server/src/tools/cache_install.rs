//! cache_install tool implementation.
//!
//! Delivers the install trigger for the configured generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;
use crate::handler::AppState;

/// Implementation of the cache_install tool.
pub async fn install_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let report = state.deploy().await?;
    json_result(&report)
}
