//! Request and response descriptors exchanged between the router, the cache
//! store and the network.

use serde::{Deserialize, Serialize};
use url::Url;

/// An outgoing request as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Upper-case HTTP method.
    pub method: String,
    /// Absolute target URL without fragment.
    pub url: Url,
}

impl Request {
    /// Build a GET request for `url`.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Build a request with an arbitrary method. The method is upper-cased and
    /// the fragment is dropped, since neither participates in cache matching.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url }
    }

    /// Hostname of the target, if the URL has one.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Only GET requests are ever answered from the cache store.
    pub fn is_cacheable(&self) -> bool {
        self.method == "GET"
    }
}

/// A response, whether it came from the network or from a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        Response {
            url: "https://example.com/".into(),
            status,
            content_type: None,
            headers: Vec::new(),
            body: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_request_drops_fragment_and_normalizes_method() {
        let req = Request::new(" post ", Url::parse("https://example.com/a#top").unwrap());
        assert_eq!(req.method, "POST");
        assert_eq!(req.url.as_str(), "https://example.com/a");
        assert!(!req.is_cacheable());
    }

    #[test]
    fn test_get_is_cacheable() {
        let req = Request::get(Url::parse("https://example.com/app.html").unwrap());
        assert!(req.is_cacheable());
        assert_eq!(req.host(), Some("example.com"));
    }

    #[test]
    fn test_response_ok_range() {
        assert!(response(200).is_ok());
        assert!(response(204).is_ok());
        assert!(!response(304).is_ok());
        assert!(!response(404).is_ok());
        assert_eq!(response(200).text(), "hello");
    }
}
