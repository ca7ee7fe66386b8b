//! Scripted network and storage used by router and registration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use precache_core::{CacheStorage, Error, MemoryStorage, Request, Response};

use crate::fetch::Network;

enum Reply {
    Serve { status: u16, body: String },
    Fail,
}

/// A [`Network`] that answers from a fixed table and records every call.
///
/// URLs without a scripted reply fail like an unreachable host.
#[derive(Default)]
pub(crate) struct StubNetwork {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(self, url: &str, body: &str) -> Self {
        self.status(url, 200, body)
    }

    pub(crate) fn status(self, url: &str, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Serve { status, body: body.to_string() });
        self
    }

    pub(crate) fn fail(self, url: &str) -> Self {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Fail);
        self
    }

    /// Make a previously served URL unreachable.
    pub(crate) fn go_offline(&self, url: &str) {
        self.replies.lock().unwrap().insert(url.to_string(), Reply::Fail);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        match self.replies.lock().unwrap().get(&url) {
            Some(Reply::Serve { status, body }) => Ok(Response {
                url: url.clone(),
                status: *status,
                content_type: Some("text/plain".to_string()),
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            }),
            Some(Reply::Fail) | None => Err(Error::Network(format!("{url}: connection refused"))),
        }
    }
}

/// In-memory storage whose deletes and cross-generation lookups can be made
/// to fail on demand.
#[derive(Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    fail_delete: AtomicBool,
    fail_match: AtomicBool,
}

impl FlakyStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_lookups(&self, fail: bool) {
        self.fail_match.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.open(name).await
    }

    async fn put_all(&self, name: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        self.inner.put_all(name, pairs).await
    }

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_in(name, request).await
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        if self.fail_match.load(Ordering::SeqCst) {
            return Err(Error::MigrationFailed("database is locked".to_string()));
        }
        self.inner.match_any(request).await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::MigrationFailed("disk busy".to_string()));
        }
        self.inner.delete(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, Error> {
        self.inner.entries(name).await
    }
}
