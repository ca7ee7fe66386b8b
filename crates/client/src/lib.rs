//! Client side of precache.
//!
//! This crate provides the network client, routing rules, the cache router
//! that answers install/activate/fetch, and the registration host that
//! delivers those triggers and tracks client control.

pub mod fetch;
pub mod registration;
pub mod router;
pub mod routing;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use registration::{DeployReport, Registration, RegistrationStatus, Served};
pub use router::{ActivateReport, AssetManifest, CacheRouter, FetchOutcome, InstallReport, LifecycleOptions, Source};
pub use routing::{Route, RoutingTable};
