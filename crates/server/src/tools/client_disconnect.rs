//! client_disconnect tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::handler::AppState;
use precache_core::Error;

/// Parameters for the client_disconnect tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientDisconnectParams {
    /// Identifier passed to client_connect.
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDisconnectOutput {
    pub client_id: String,
    pub disconnected: bool,
}

/// Implementation of the client_disconnect tool.
pub async fn disconnect_impl(state: &AppState, params: ClientDisconnectParams) -> Result<CallToolResult, McpError> {
    let client_id = params.client_id.trim().to_string();
    if !state.registration.disconnect_client(&client_id).await {
        return Err(Error::InvalidInput(format!("unknown client: {client_id}")).into());
    }

    tracing::debug!(client_id = %client_id, "client disconnected");
    json_result(&ClientDisconnectOutput { client_id, disconnected: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::client_connect::{ClientConnectParams, connect_impl};
    use crate::tools::testing::{FixedNetwork, output_json, state_with};

    #[tokio::test]
    async fn test_disconnect_forgets_client() {
        let state = state_with(FixedNetwork::default());
        connect_impl(&state, ClientConnectParams { client_id: "tab-1".into() })
            .await
            .unwrap();

        let result = disconnect_impl(&state, ClientDisconnectParams { client_id: "tab-1".into() })
            .await
            .unwrap();
        assert_eq!(output_json(&result)["disconnected"], true);
        assert!(state.registration.status().await.clients.is_empty());

        let err = disconnect_impl(&state, ClientDisconnectParams { client_id: "tab-1".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
