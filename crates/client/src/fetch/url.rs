//! Locator resolution for manifest entries and fetch targets.

use url::Url;

/// Error type for locator resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a locator against the deployment scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative paths (`./app.html`, `/x`, `x`) against `scope`;
///    absolute URLs are kept as given
/// 3. Only http and https are accepted
/// 4. Remove fragment (#...); the query string stays intact
pub fn resolve(scope: &Url, locator: &str) -> Result<Url, UrlError> {
    let trimmed = locator.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = scope.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    resolved.set_fragment(None);

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("https://tools.example.com/expenses/").unwrap()
    }

    #[test]
    fn test_resolve_dot_relative() {
        let url = resolve(&scope(), "./expenses.html").unwrap();
        assert_eq!(url.as_str(), "https://tools.example.com/expenses/expenses.html");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&scope(), "/manifest.json").unwrap();
        assert_eq!(url.as_str(), "https://tools.example.com/manifest.json");
    }

    #[test]
    fn test_resolve_absolute_keeps_query() {
        let url = resolve(&scope(), "https://fonts.googleapis.com/css2?family=Inconsolata&display=swap").unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
        assert_eq!(url.query(), Some("family=Inconsolata&display=swap"));
    }

    #[test]
    fn test_resolve_lowercases_host() {
        let url = resolve(&scope(), "https://FirebaseIO.com/data").unwrap();
        assert_eq!(url.host_str(), Some("firebaseio.com"));
    }

    #[test]
    fn test_resolve_removes_fragment() {
        let url = resolve(&scope(), "./expenses.html#list").unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_trims_whitespace() {
        let url = resolve(&scope(), "  ./manifest.json  ").unwrap();
        assert_eq!(url.as_str(), "https://tools.example.com/expenses/manifest.json");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "chrome-extension://abc/page.html");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&scope(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }
}
