//! Fixtures shared by the tool tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use precache_client::Network;
use precache_core::{AppConfig, Error, MemoryStorage, Request, Response};
use rmcp::model::CallToolResult;

use crate::handler::AppState;

/// Network that serves a fixed set of URLs and refuses everything else.
#[derive(Default)]
pub(crate) struct FixedNetwork {
    pages: HashMap<String, String>,
}

impl FixedNetwork {
    pub(crate) fn serve(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Network for FixedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        match self.pages.get(&url) {
            Some(body) => Ok(Response {
                url,
                status: 200,
                content_type: Some("text/html".to_string()),
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            }),
            None => Err(Error::Network(format!("{url}: connection refused"))),
        }
    }
}

/// Default configuration over in-memory storage and the given network.
pub(crate) fn state_with(network: FixedNetwork) -> AppState {
    state_with_config(AppConfig::default(), network)
}

pub(crate) fn state_with_config(config: AppConfig, network: FixedNetwork) -> AppState {
    AppState::new(config, Arc::new(MemoryStorage::new()), Arc::new(network))
}

/// Parse the JSON text content of a tool result.
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
