//! cache_fetch tool implementation.
//!
//! Delivers the fetch trigger for one request and reports where the response
//! came from.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::handler::AppState;
use precache_client::{Source, fetch::resolve};
use precache_core::{Error, Request};

/// Input parameters for the cache_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheFetchParams {
    /// Target URL, absolute or relative to the configured scope.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests can be served from the cache.
    #[serde(default = "default_method")]
    pub method: String,

    /// Client context issuing the request. Omit for a navigation request.
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the cache_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// Final URL of the response.
    pub response_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub source: Source,
    /// False when the router did not handle the request.
    pub intercepted: bool,
    /// Generation that handled the request.
    pub generation: Option<String>,
    pub bytes: usize,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

/// Implementation of the cache_fetch tool.
pub async fn fetch_impl(state: &AppState, params: CacheFetchParams) -> Result<CallToolResult, McpError> {
    let scope = state
        .config
        .scope_url()
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let url = resolve(&scope, &params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let request = Request::new(&params.method, url);

    let served = state
        .registration
        .fetch(params.client_id.as_deref(), &request)
        .await?;

    let output = CacheFetchOutput {
        url: request.url.to_string(),
        response_url: served.response.url.clone(),
        status: served.response.status,
        content_type: served.response.content_type.clone(),
        source: served.source,
        intercepted: served.intercepted,
        generation: served.generation,
        bytes: served.response.body.len(),
        body: served.response.text(),
    };

    json_result(&output)
}
