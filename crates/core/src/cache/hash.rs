//! Content-addressed request key generation.

use sha2::{Digest, Sha256};

use crate::Request;

/// Compute the cache key for a request method and URL.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache key for a request.
pub fn request_key(request: &Request) -> String {
    compute_request_key(&request.method, request.url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_request_key("GET", "https://example.com/app.html");
        let hash2 = compute_request_key("GET", "https://example.com/app.html");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_request_key("GET", "https://example.com/");
        let head = compute_request_key("HEAD", "https://example.com/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_fragment_does_not_change_key() {
        let a = Request::get(Url::parse("https://example.com/app.html#intro").unwrap());
        let b = Request::get(Url::parse("https://example.com/app.html").unwrap());
        assert_eq!(request_key(&a), request_key(&b));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_request_key("GET", "https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
