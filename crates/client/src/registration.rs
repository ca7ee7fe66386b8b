//! Registration host.
//!
//! Plays the role of the hosting environment: it delivers install and activate
//! to routers, keeps track of which generation is active or waiting, and
//! decides which client contexts are controlled. Fetches from controlled
//! clients go through the active router; all other fetches go straight to the
//! network.

use std::collections::BTreeMap;
use std::sync::Arc;

use precache_core::{Error, Generation, Request, Response};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::fetch::Network;
use crate::router::{ActivateReport, CacheRouter, FetchOutcome, InstallReport, Source};

/// What happened to a newly installed router.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub install: InstallReport,
    /// Present when the router was activated right away.
    pub activation: Option<ActivateReport>,
    /// Clients now controlled by the new generation.
    pub claimed: Vec<String>,
}

/// A response delivered to a client.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: Source,
    /// False when the request bypassed the router entirely.
    pub intercepted: bool,
    /// Generation that handled the request, if any.
    pub generation: Option<String>,
}

/// A client context and its controlling generation.
#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub id: String,
    pub controller: Option<String>,
}

/// Point-in-time view of the registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationStatus {
    pub active: Option<Generation>,
    pub waiting: Option<Generation>,
    pub clients: Vec<ClientInfo>,
}

#[derive(Default)]
struct Slots {
    active: Option<Arc<CacheRouter>>,
    waiting: Option<Arc<CacheRouter>>,
    clients: BTreeMap<String, Option<String>>,
}

/// Host for a sequence of cache router deployments.
pub struct Registration {
    network: Arc<dyn Network>,
    slots: RwLock<Slots>,
}

impl Registration {
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self { network, slots: RwLock::new(Slots::default()) }
    }

    pub async fn active(&self) -> Option<Arc<CacheRouter>> {
        self.slots.read().await.active.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<CacheRouter>> {
        self.slots.read().await.waiting.clone()
    }

    /// Deliver install to `router`.
    ///
    /// On failure the currently active generation stays in place. On success
    /// the router is activated right away if it asked to skip waiting or
    /// nothing is active yet; otherwise it waits for [`activate_waiting`].
    ///
    /// [`activate_waiting`]: Registration::activate_waiting
    pub async fn install(&self, router: Arc<CacheRouter>) -> Result<DeployReport, Error> {
        let install = router.install().await?;

        let immediate = router.options().skip_waiting || self.slots.read().await.active.is_none();
        if !immediate {
            tracing::info!(generation = %router.cache_name(), "installed generation is waiting");
            self.slots.write().await.waiting = Some(router);
            return Ok(DeployReport { install, activation: None, claimed: Vec::new() });
        }

        match self.activate(router.clone()).await {
            Ok((activation, claimed)) => Ok(DeployReport { install, activation: Some(activation), claimed }),
            Err(e) => {
                tracing::warn!(generation = %router.cache_name(), error = %e, "activation failed, generation is waiting");
                self.slots.write().await.waiting = Some(router);
                Err(e)
            }
        }
    }

    /// Activate the waiting router.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoWaitingGeneration` if nothing is waiting. A router
    /// whose activation fails stays waiting.
    pub async fn activate_waiting(&self) -> Result<ActivateReport, Error> {
        let router = self.waiting().await.ok_or(Error::NoWaitingGeneration)?;
        let (report, _) = self.activate(router).await?;
        Ok(report)
    }

    async fn activate(&self, router: Arc<CacheRouter>) -> Result<(ActivateReport, Vec<String>), Error> {
        let report = router.activate().await?;
        let name = router.cache_name().to_string();

        let mut slots = self.slots.write().await;
        if slots.waiting.as_ref().is_some_and(|w| Arc::ptr_eq(w, &router)) {
            slots.waiting = None;
        }
        if let Some(previous) = slots.active.replace(router.clone())
            && let Err(e) = previous.supersede().await
        {
            tracing::warn!(generation = %previous.cache_name(), error = %e, "could not supersede previous generation");
        }

        let mut claimed = Vec::new();
        if router.options().claim_clients {
            for (id, controller) in slots.clients.iter_mut() {
                if controller.as_deref() != Some(name.as_str()) {
                    *controller = Some(name.clone());
                    claimed.push(id.clone());
                }
            }
            tracing::info!(generation = %name, claimed = claimed.len(), "claimed clients");
        }

        Ok((report, claimed))
    }

    /// Register a client context. A client opened while a generation is
    /// active is controlled by it. Returns the controlling generation.
    pub async fn connect_client(&self, id: &str) -> Option<String> {
        let mut slots = self.slots.write().await;
        let controller = slots.active.as_ref().map(|r| r.cache_name().to_string());
        slots.clients.insert(id.to_string(), controller.clone());
        controller
    }

    /// Forget a client context. Returns false if it was not registered.
    pub async fn disconnect_client(&self, id: &str) -> bool {
        self.slots.write().await.clients.remove(id).is_some()
    }

    /// Deliver a fetch on behalf of `client`.
    ///
    /// A request without a client (a navigation) is handled by the active
    /// generation. A client is only intercepted while its controller is the
    /// active generation.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` for an unregistered client id
    /// - network and storage errors propagated from the router or the network
    pub async fn fetch(&self, client: Option<&str>, request: &Request) -> Result<Served, Error> {
        let router = {
            let slots = self.slots.read().await;
            let active = slots.active.clone();
            match client {
                None => active,
                Some(id) => {
                    let controller = slots
                        .clients
                        .get(id)
                        .ok_or_else(|| Error::InvalidInput(format!("unknown client: {id}")))?;
                    active.filter(|r| controller.as_deref() == Some(r.cache_name()))
                }
            }
        };

        if let Some(router) = router {
            let generation = Some(router.cache_name().to_string());
            if let FetchOutcome::Responded { response, source } = router.fetch(request).await? {
                return Ok(Served { response, source, intercepted: true, generation });
            }
        }

        let response = self.network.fetch(request).await?;
        Ok(Served { response, source: Source::Network, intercepted: false, generation: None })
    }

    pub async fn status(&self) -> RegistrationStatus {
        let (active, waiting, clients) = {
            let slots = self.slots.read().await;
            let clients = slots
                .clients
                .iter()
                .map(|(id, controller)| ClientInfo { id: id.clone(), controller: controller.clone() })
                .collect();
            (slots.active.clone(), slots.waiting.clone(), clients)
        };

        RegistrationStatus {
            active: match active {
                Some(r) => r.generation().await,
                None => None,
            },
            waiting: match waiting {
                Some(r) => r.generation().await,
                None => None,
            },
            clients,
        }
    }
}
