//! Asset manifest: the resources a generation must hold once installed.

use precache_core::{Error, Request};
use url::Url;

use crate::fetch::resolve;

/// Ordered, duplicate-free list of GET requests resolved against the scope.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    requests: Vec<Request>,
}

impl AssetManifest {
    /// Resolve every locator against `scope`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidUrl` if a locator cannot be resolved
    /// - `Error::InvalidInput` if two locators resolve to the same URL
    pub fn resolve<I, S>(scope: &Url, locators: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requests: Vec<Request> = Vec::new();
        for locator in locators {
            let locator = locator.as_ref();
            let url = resolve(scope, locator).map_err(|e| Error::InvalidUrl(format!("{locator}: {e}")))?;
            if requests.iter().any(|r| r.url == url) {
                return Err(Error::InvalidInput(format!("duplicate manifest entry: {url}")));
            }
            requests.push(Request::get(url));
        }
        Ok(Self { requests })
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.iter().map(|r| r.url.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
