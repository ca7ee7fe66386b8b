//! MCP server handler implementation.
//!
//! This module defines the shared server state and the handler that
//! routes tool calls to the trigger implementations.
use std::sync::Arc;

use crate::tools::{
    cache_activate::activate_impl,
    cache_fetch::{CacheFetchParams, fetch_impl},
    cache_install::install_impl,
    cache_keys::keys_impl,
    client_connect::{ClientConnectParams, connect_impl},
    client_disconnect::{ClientDisconnectParams, disconnect_impl},
};
use precache_client::{CacheRouter, DeployReport, Network, Registration};
use precache_core::{AppConfig, CacheStorage, Error};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Everything the tools share: configuration, the injected store and
/// network, and the registration that tracks deployments.
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub registration: Registration,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        let registration = Registration::new(network.clone());
        Self { config, storage, network, registration }
    }

    /// Build a router for the configured generation and deliver install to it.
    pub async fn deploy(&self) -> Result<DeployReport, Error> {
        let router = CacheRouter::from_config(&self.config, self.storage.clone(), self.network.clone())?;
        self.registration.install(Arc::new(router)).await
    }
}

/// The main MCP server handler for precache.
#[derive(Clone)]
pub struct PrecacheServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PrecacheServer {
    /// Create a new server handler.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Install the configured cache generation: fetch every manifest asset and store them as one unit. Activates immediately when skip_waiting is set or nothing is active."
    )]
    async fn cache_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.state).await
    }

    #[tool(description = "Activate the installed generation that is waiting, deleting stale generations.")]
    async fn cache_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.state).await
    }

    #[tool(
        description = "Fetch a URL through the cache router. Relative URLs resolve against the configured scope. Reports whether the response came from the cache or the network."
    )]
    async fn cache_fetch(&self, params: Parameters<CacheFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache generations with their stored URLs, and the active and waiting generation states.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        keys_impl(&self.state).await
    }

    #[tool(description = "Register a client context. Clients opened while a generation is active are controlled by it.")]
    async fn client_connect(&self, params: Parameters<ClientConnectParams>) -> Result<CallToolResult, McpError> {
        connect_impl(&self.state, params.0).await
    }

    #[tool(description = "Forget a client context registered with client_connect.")]
    async fn client_disconnect(&self, params: Parameters<ClientDisconnectParams>) -> Result<CallToolResult, McpError> {
        disconnect_impl(&self.state, params.0).await
    }
}

impl ServerHandler for PrecacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "precache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FixedNetwork, state_with};

    #[test]
    fn test_lists_all_tools() {
        let server = PrecacheServer::new(Arc::new(state_with(FixedNetwork::default())));
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        let expected = [
            "cache_install",
            "cache_activate",
            "cache_fetch",
            "cache_keys",
            "client_connect",
            "client_disconnect",
        ];
        for expected in expected {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }

    #[tokio::test]
    async fn test_deploy_activates_configured_generation() {
        let network = FixedNetwork::default()
            .serve("http://localhost:8080/index.html", "<html>")
            .serve("http://localhost:8080/manifest.json", "{}");
        let state = state_with(network);

        let report = state.deploy().await.unwrap();
        assert_eq!(report.install.generation, "precache-v1");
        assert!(report.activation.is_some());
    }
}
