//! client_connect tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::handler::AppState;
use precache_core::Error;

/// Parameters for the client_connect tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientConnectParams {
    /// Identifier of the client context (e.g. a tab id).
    pub client_id: String,
}

/// Output from the client_connect tool.
#[derive(Debug, Clone, Serialize)]
pub struct ClientConnectOutput {
    pub client_id: String,
    /// Generation controlling the client, if one is active.
    pub controller: Option<String>,
}

/// Implementation of the client_connect tool.
pub async fn connect_impl(state: &AppState, params: ClientConnectParams) -> Result<CallToolResult, McpError> {
    let client_id = params.client_id.trim().to_string();
    if client_id.is_empty() {
        return Err(Error::InvalidInput("client_id cannot be empty".into()).into());
    }

    let controller = state.registration.connect_client(&client_id).await;
    json_result(&ClientConnectOutput { client_id, controller })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FixedNetwork, output_json, state_with};

    #[tokio::test]
    async fn test_connect_before_install_is_uncontrolled() {
        let state = state_with(FixedNetwork::default());
        let result = connect_impl(&state, ClientConnectParams { client_id: "tab-1".into() })
            .await
            .unwrap();
        let output = output_json(&result);
        assert_eq!(output["client_id"], "tab-1");
        assert!(output["controller"].is_null());
    }

    #[tokio::test]
    async fn test_connect_empty_id() {
        let state = state_with(FixedNetwork::default());
        let result = connect_impl(&state, ClientConnectParams { client_id: "  ".into() }).await;
        assert!(result.is_err());
    }
}
