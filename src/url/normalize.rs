use crate::{UrlError, UrlResult};
use url::Url;

/// Link targets ending in one of these are binary assets, never pages
pub const BINARY_EXTENSIONS: &[&str] = &[".jpg", ".png", ".gif", ".jpeg", ".pdf"];

/// Returns the canonical form of a URL string
///
/// Surrounding whitespace and trailing `/` characters are removed; nothing
/// else changes. Pages are identified by this exact string.
///
/// # Examples
///
/// ```
/// use sumi_seek::url::canonicalize_url;
///
/// assert_eq!(canonicalize_url("https://ngs.ru/"), "https://ngs.ru");
/// assert_eq!(canonicalize_url("https://ngs.ru/news//"), "https://ngs.ru/news");
/// ```
pub fn canonicalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Validates a seed URL and returns its canonical form
///
/// # Returns
///
/// * `Ok(String)` - Canonical seed URL
/// * `Err(UrlError)` - The seed is not an absolute http(s) URL
pub fn canonicalize_seed(seed: &str) -> UrlResult<String> {
    let parsed = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    Ok(canonicalize_url(seed))
}

/// Applies the outgoing-link filter to an anchor href
///
/// # Rejection Rules
///
/// - contains `mailto:` or `tel:`
/// - ends with a binary asset extension (`.jpg .png .gif .jpeg .pdf`)
/// - does not start with `http` (relative links are not resolved)
///
/// Accepted hrefs have their trailing `/` trimmed.
///
/// # Examples
///
/// ```
/// use sumi_seek::url::filter_link;
///
/// assert_eq!(filter_link("http://ok.com/"), Some("http://ok.com".to_string()));
/// assert_eq!(filter_link("relative/path"), None);
/// ```
pub fn filter_link(href: &str) -> Option<String> {
    let href = href.trim();

    if href.contains("mailto:") || href.contains("tel:") {
        return None;
    }

    if BINARY_EXTENSIONS.iter().any(|ext| href.ends_with(ext)) {
        return None;
    }

    if !href.starts_with("http") {
        return None;
    }

    let canonical = canonicalize_url(href);
    if canonical.is_empty() {
        return None;
    }

    Some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_strips_trailing_slashes() {
        assert_eq!(canonicalize_url("https://lenta.ru/"), "https://lenta.ru");
        assert_eq!(canonicalize_url("https://lenta.ru///"), "https://lenta.ru");
        assert_eq!(canonicalize_url("https://lenta.ru/a"), "https://lenta.ru/a");
        assert_eq!(canonicalize_url("  https://lenta.ru/ "), "https://lenta.ru");
    }

    #[test]
    fn test_canonicalize_seed() {
        assert_eq!(
            canonicalize_seed("https://ngs.ru/").unwrap(),
            "https://ngs.ru"
        );
        assert!(matches!(
            canonicalize_seed("ftp://ngs.ru/"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            canonicalize_seed("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_filter_keeps_only_absolute_http_links() {
        let hrefs = [
            "mailto:a@b.com",
            "tel:123",
            "/x.jpg",
            "http://ok.com/",
            "relative/path",
        ];
        let kept: Vec<String> = hrefs.iter().filter_map(|h| filter_link(h)).collect();
        assert_eq!(kept, vec!["http://ok.com".to_string()]);
    }

    #[test]
    fn test_filter_rejects_binary_assets_on_absolute_urls() {
        for ext in BINARY_EXTENSIONS {
            let href = format!("https://cdn.example.com/file{}", ext);
            assert_eq!(filter_link(&href), None, "{} should be rejected", href);
        }
    }

    #[test]
    fn test_filter_rejects_embedded_schemes() {
        assert_eq!(filter_link("https://example.com/?to=mailto:x@y.z"), None);
        assert_eq!(filter_link("https://example.com/call?tel:1"), None);
    }

    #[test]
    fn test_filter_accepts_https() {
        assert_eq!(
            filter_link("https://example.com/news/"),
            Some("https://example.com/news".to_string())
        );
    }
}
