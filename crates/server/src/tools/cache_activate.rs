//! cache_activate tool implementation.
//!
//! Activates a generation that installed but was left waiting.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;
use crate::handler::AppState;

/// Implementation of the cache_activate tool.
pub async fn activate_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let report = state.registration.activate_waiting().await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache_install::install_impl;
    use crate::tools::testing::{FixedNetwork, output_json, state_with_config};
    use precache_core::AppConfig;

    fn network() -> FixedNetwork {
        FixedNetwork::default().serve("https://tools.example.com/app.html", "<html>")
    }

    fn config(name: &str) -> AppConfig {
        AppConfig {
            cache_name: name.into(),
            scope: "https://tools.example.com/".into(),
            assets: vec!["./app.html".into()],
            skip_waiting: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_activate_without_waiting_generation() {
        let state = state_with_config(config("v1"), network());
        let err = activate_impl(&state).await.unwrap_err();
        assert_eq!(err.code.0, -32022);
    }

    #[tokio::test]
    async fn test_activate_waiting_generation() {
        let state = state_with_config(config("v2"), network());
        // v1 activates on first install since nothing is active yet
        let v1 = precache_client::CacheRouter::from_config(&config("v1"), state.storage.clone(), state.network.clone())
            .unwrap();
        state.registration.install(std::sync::Arc::new(v1)).await.unwrap();

        let installed = output_json(&install_impl(&state).await.unwrap());
        assert!(installed["activation"].is_null());

        let output = output_json(&activate_impl(&state).await.unwrap());
        assert_eq!(output["generation"], "v2");
        assert_eq!(output["deleted"], serde_json::json!(["v1"]));
    }
}
