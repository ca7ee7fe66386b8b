//! Per-request routing rules.
//!
//! A request whose hostname contains any configured dynamic-provider pattern
//! is live data and is routed around the cache; everything else is a static
//! asset served cache-first.

use precache_core::{AppConfig, DynamicPolicy, Request};

/// Where a fetch trigger is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted; the host performs a plain network fetch.
    PassThrough,
    /// Network first, cached entry on network failure.
    NetworkFirst,
    /// Cached entry if present, network otherwise.
    CacheFirst,
}

/// The fixed set of dynamic-provider host patterns and how they are handled.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    dynamic_hosts: Vec<String>,
    policy: DynamicPolicy,
}

impl RoutingTable {
    pub fn new<I, S>(dynamic_hosts: I, policy: DynamicPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dynamic_hosts = dynamic_hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { dynamic_hosts, policy }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.dynamic_hosts, config.dynamic_policy)
    }

    /// Whether `host` belongs to a dynamic-data provider (substring match).
    pub fn is_dynamic(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.dynamic_hosts.iter().any(|pattern| host.contains(pattern.as_str()))
    }

    /// Pick the route for a request. Requests without a host are static.
    pub fn route(&self, request: &Request) -> Route {
        match request.host() {
            Some(host) if self.is_dynamic(host) => match self.policy {
                DynamicPolicy::PassThrough => Route::PassThrough,
                DynamicPolicy::NetworkFirst => Route::NetworkFirst,
            },
            _ => Route::CacheFirst,
        }
    }
}
