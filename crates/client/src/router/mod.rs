//! Offline asset cache router.
//!
//! One router per deployed cache generation. It answers the three host triggers:
//!
//! - **install**: open the generation and store every manifest asset as one
//!   unit. Any failed fetch or non-2xx status fails the install.
//! - **activate**: delete every other generation (when pruning), then become
//!   the current generation.
//! - **fetch**: route by host. Dynamic providers are passed through or served
//!   network-first; everything else is served cache-first. Responses are
//!   never written back to the cache.

pub mod manifest;

use std::sync::Arc;

use futures_util::future::try_join_all;
use precache_core::{AppConfig, CacheStorage, Error, Generation, GenerationState, Request, Response};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::fetch::Network;
use crate::routing::{Route, RoutingTable};

pub use manifest::AssetManifest;

/// Lifecycle switches applied by the host around install and activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleOptions {
    /// Activate right after a successful install.
    pub skip_waiting: bool,
    /// Take control of open clients on activation.
    pub claim_clients: bool,
    /// Delete non-current generations on activation.
    pub prune_stale: bool,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self { skip_waiting: true, claim_clients: true, prune_stale: true }
    }
}

impl From<&AppConfig> for LifecycleOptions {
    fn from(config: &AppConfig) -> Self {
        Self { skip_waiting: config.skip_waiting, claim_clients: config.claim_clients, prune_stale: config.prune_stale }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Network,
}

/// Result of the fetch trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The router declined; the host must perform the request itself.
    NotIntercepted,
    /// The router produced a response.
    Responded { response: Response, source: Source },
}

/// Result of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub generation: String,
    /// URLs stored, in manifest order.
    pub stored: Vec<String>,
}

/// Result of a successful activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub generation: String,
    /// Generations deleted during activation.
    pub deleted: Vec<String>,
}

/// Cache router for one generation.
pub struct CacheRouter {
    cache_name: String,
    manifest: AssetManifest,
    routes: RoutingTable,
    options: LifecycleOptions,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    generation: RwLock<Option<Generation>>,
}

impl CacheRouter {
    pub fn new(
        cache_name: impl Into<String>, manifest: AssetManifest, routes: RoutingTable, options: LifecycleOptions,
        storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>,
    ) -> Self {
        Self {
            cache_name: cache_name.into(),
            manifest,
            routes,
            options,
            storage,
            network,
            generation: RwLock::new(None),
        }
    }

    /// Build a router from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope or a manifest entry cannot be resolved.
    pub fn from_config(
        config: &AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>,
    ) -> Result<Self, Error> {
        let scope = config.scope_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let manifest = AssetManifest::resolve(&scope, &config.assets)?;
        Ok(Self::new(
            config.cache_name.clone(),
            manifest,
            RoutingTable::from_config(config),
            LifecycleOptions::from(config),
            storage,
            network,
        ))
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn options(&self) -> LifecycleOptions {
        self.options
    }

    /// Current lifecycle state; `None` before install.
    pub async fn state(&self) -> Option<GenerationState> {
        self.generation.read().await.as_ref().map(|g| g.state)
    }

    /// Snapshot of the generation record; `None` before install.
    pub async fn generation(&self) -> Option<Generation> {
        self.generation.read().await.clone()
    }

    /// Install trigger.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidTransition` if install already ran for this router
    /// - `Error::InstallFailed` if any manifest asset could not be fetched or
    ///   was not a 2xx response; nothing is stored in that case
    /// - storage errors from writing the generation
    pub async fn install(&self) -> Result<InstallReport, Error> {
        {
            let mut slot = self.generation.write().await;
            if let Some(existing) = slot.as_ref() {
                return Err(Error::InvalidTransition {
                    generation: self.cache_name.clone(),
                    from: existing.state.to_string(),
                    to: GenerationState::Installing.to_string(),
                });
            }
            tracing::info!(generation = %self.cache_name, assets = self.manifest.len(), "installing generation");
            *slot = Some(Generation::installing(&self.cache_name));
        }

        let outcome = self.populate().await;
        let next = if outcome.is_ok() { GenerationState::Installed } else { GenerationState::Failed };
        self.advance(next).await?;

        match outcome {
            Ok(stored) => Ok(InstallReport { generation: self.cache_name.clone(), stored }),
            Err(e) => {
                tracing::warn!(generation = %self.cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<Vec<String>, Error> {
        self.storage.open(&self.cache_name).await?;

        let pairs = try_join_all(self.manifest.requests().iter().map(|request| async move {
            let response = self.network.fetch(request).await.map_err(|e| Error::InstallFailed {
                generation: self.cache_name.clone(),
                reason: e.to_string(),
            })?;
            if !response.is_ok() {
                return Err(Error::InstallFailed {
                    generation: self.cache_name.clone(),
                    reason: format!("{}: status {}", request.url, response.status),
                });
            }
            Ok((request.clone(), response))
        }))
        .await?;

        self.storage.put_all(&self.cache_name, &pairs).await?;

        Ok(self.manifest.urls())
    }

    /// Activate trigger.
    ///
    /// Stale generations are deleted before this returns. If deletion fails the
    /// generation stays `installed`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidTransition` unless the generation is `installed`
    /// - storage errors from enumerating or deleting generations
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let state = self.state().await;
        if state != Some(GenerationState::Installed) {
            return Err(Error::InvalidTransition {
                generation: self.cache_name.clone(),
                from: state.map_or_else(|| "uninstalled".to_string(), |s| s.to_string()),
                to: GenerationState::Active.to_string(),
            });
        }

        let mut deleted = Vec::new();
        if self.options.prune_stale {
            for name in self.storage.keys().await? {
                if name != self.cache_name && self.storage.delete(&name).await? {
                    tracing::info!(generation = %name, current = %self.cache_name, "deleted stale generation");
                    deleted.push(name);
                }
            }
        }

        self.advance(GenerationState::Active).await?;

        Ok(ActivateReport { generation: self.cache_name.clone(), deleted })
    }

    /// Mark this generation as replaced by a newer one.
    pub async fn supersede(&self) -> Result<(), Error> {
        self.advance(GenerationState::Superseded).await
    }

    async fn advance(&self, next: GenerationState) -> Result<(), Error> {
        let mut slot = self.generation.write().await;
        match slot.as_mut() {
            Some(generation) => generation.advance(next),
            None => Err(Error::InvalidTransition {
                generation: self.cache_name.clone(),
                from: "uninstalled".to_string(),
                to: next.to_string(),
            }),
        }
    }

    /// Fetch trigger.
    ///
    /// # Errors
    ///
    /// Propagates the network error when the network fails and no cached
    /// entry can stand in. On the cache-first path, storage errors from the
    /// lookup are returned as is.
    pub async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let route = self.routes.route(request);
        tracing::debug!(method = %request.method, url = %request.url, ?route, "routing request");

        match route {
            Route::PassThrough => Ok(FetchOutcome::NotIntercepted),
            Route::NetworkFirst => self.network_first(request).await,
            Route::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        match self.network.fetch(request).await {
            Ok(response) => Ok(FetchOutcome::Responded { response, source: Source::Network }),
            Err(err) => match self.storage.match_any(request).await {
                Ok(Some(response)) => {
                    tracing::warn!(url = %request.url, error = %err, "network failed, serving cached entry");
                    Ok(FetchOutcome::Responded { response, source: Source::Cache })
                }
                Ok(None) => Err(err),
                Err(lookup) => {
                    tracing::warn!(url = %request.url, error = %lookup, "cache lookup failed after network error");
                    Err(err)
                }
            },
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if let Some(response) = self.storage.match_any(request).await? {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(FetchOutcome::Responded { response, source: Source::Cache });
        }

        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome::Responded { response, source: Source::Network })
    }
}
