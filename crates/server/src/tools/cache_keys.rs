//! cache_keys tool implementation.
//!
//! Lists stored generations and the registration's lifecycle view.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use super::json_result;
use crate::handler::AppState;
use precache_client::RegistrationStatus;

/// One stored generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationEntries {
    pub name: String,
    /// Request URLs stored in the generation.
    pub entries: Vec<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheKeysOutput {
    /// Generations in creation order.
    pub generations: Vec<GenerationEntries>,
    pub registration: RegistrationStatus,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let mut generations = Vec::new();
    for name in state.storage.keys().await? {
        let entries = state.storage.entries(&name).await?;
        generations.push(GenerationEntries { name, entries });
    }

    let registration = state.registration.status().await;
    json_result(&CacheKeysOutput { generations, registration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FixedNetwork, output_json, state_with};

    #[tokio::test]
    async fn test_keys_empty_store() {
        let state = state_with(FixedNetwork::default());
        let output = output_json(&keys_impl(&state).await.unwrap());
        assert_eq!(output["generations"], serde_json::json!([]));
        assert!(output["registration"]["active"].is_null());
    }

    #[tokio::test]
    async fn test_keys_after_install() {
        let state = state_with(
            FixedNetwork::default()
                .serve("http://localhost:8080/index.html", "<html>")
                .serve("http://localhost:8080/manifest.json", "{}"),
        );
        state.deploy().await.unwrap();

        let output = output_json(&keys_impl(&state).await.unwrap());

        assert_eq!(output["generations"][0]["name"], "precache-v1");
        assert_eq!(
            output["generations"][0]["entries"],
            serde_json::json!(["http://localhost:8080/index.html", "http://localhost:8080/manifest.json"])
        );
        assert_eq!(output["registration"]["active"]["state"], "active");
    }
}
