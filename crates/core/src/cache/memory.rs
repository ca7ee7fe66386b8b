//! Process-local cache storage.
//!
//! Uses a Vec of generations (creation order) behind a tokio RwLock.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::hash::request_key;
use super::storage::CacheStorage;
use crate::{Error, Request, Response};

#[derive(Debug, Default)]
struct MemoryGeneration {
    name: String,
    /// (request key, request url, response) in insertion order.
    entries: Vec<(String, String, Response)>,
}

impl MemoryGeneration {
    fn find(&self, key: &str) -> Option<&Response> {
        self.entries.iter().find(|(k, _, _)| k == key).map(|(_, _, r)| r)
    }

    fn upsert(&mut self, key: String, url: String, response: Response) {
        match self.entries.iter_mut().find(|(k, _, _)| *k == key) {
            Some(slot) => slot.2 = response,
            None => self.entries.push((key, url, response)),
        }
    }
}

/// In-memory [`CacheStorage`] backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    generations: RwLock<Vec<MemoryGeneration>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slot<'a>(generations: &'a mut Vec<MemoryGeneration>, name: &str) -> &'a mut MemoryGeneration {
    match generations.iter().position(|g| g.name == name) {
        Some(idx) => &mut generations[idx],
        None => {
            generations.push(MemoryGeneration { name: name.to_string(), entries: Vec::new() });
            let last = generations.len() - 1;
            &mut generations[last]
        }
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let mut generations = self.generations.write().await;
        slot(&mut generations, name);
        Ok(())
    }

    async fn put_all(&self, name: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        if let Some((req, _)) = pairs.iter().find(|(req, _)| !req.is_cacheable()) {
            return Err(Error::InvalidInput(format!("cannot store {} request for {}", req.method, req.url)));
        }

        let mut generations = self.generations.write().await;
        let generation = slot(&mut generations, name);
        for (req, resp) in pairs {
            generation.upsert(request_key(req), req.url.to_string(), resp.clone());
        }
        Ok(())
    }

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_cacheable() {
            return Ok(None);
        }
        let key = request_key(request);
        let generations = self.generations.read().await;
        Ok(generations
            .iter()
            .find(|g| g.name == name)
            .and_then(|g| g.find(&key))
            .cloned())
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_cacheable() {
            return Ok(None);
        }
        let key = request_key(request);
        let generations = self.generations.read().await;
        Ok(generations.iter().find_map(|g| g.find(&key)).cloned())
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let mut generations = self.generations.write().await;
        let before = generations.len();
        generations.retain(|g| g.name != name);
        Ok(generations.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let generations = self.generations.read().await;
        Ok(generations.iter().map(|g| g.name.clone()).collect())
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, Error> {
        let generations = self.generations.read().await;
        Ok(generations
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.entries.iter().map(|(_, url, _)| url.clone()).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_rejected_batch_leaves_nothing_behind() {
        let storage = MemoryStorage::new();
        let get = Request::get(Url::parse("https://example.com/a").unwrap());
        let post = Request::new("POST", Url::parse("https://example.com/b").unwrap());
        let resp = Response { url: "https://example.com/a".into(), status: 200, content_type: None, headers: vec![], body: vec![] };

        let result = storage.put_all("v1", &[(get.clone(), resp.clone()), (post, resp)]).await;
        assert!(result.is_err());
        assert!(storage.keys().await.unwrap().is_empty());
        assert!(storage.match_any(&get).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_of_missing_generation() {
        let storage = MemoryStorage::new();
        assert!(storage.entries("missing").await.unwrap().is_empty());
        assert!(!storage.delete("missing").await.unwrap());
    }
}
