//! Cache storage abstraction.
//!
//! The router never owns the persistent store; it receives one through this
//! trait so any backend (SQLite, memory) can be substituted.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::{Error, Request, Response};

/// A set of named cache generations holding request/response pairs.
///
/// Only GET requests can be stored or matched; lookups for any other method
/// return `None`.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named generation if absent.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Store one pair in a generation, replacing an existing entry for the request.
    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_all(name, &[(request.clone(), response.clone())]).await
    }

    /// Store every pair as one unit: all are visible afterwards, or none.
    async fn put_all(&self, name: &str, pairs: &[(Request, Response)]) -> Result<(), Error>;

    /// Look up a request in one generation.
    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Look up a request in every generation, oldest first, returning the first hit.
    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Delete a generation. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Names of all generations in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Request URLs stored in a generation.
    async fn entries(&self, name: &str) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_generation(name).await
    }

    async fn put_all(&self, name: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        self.put_entries(name, pairs).await
    }

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(name, request).await
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.match_any_entry(request).await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_generation(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.generation_names().await
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, Error> {
        self.entry_urls(name).await
    }
}
