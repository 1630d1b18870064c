//! URL processing utilities.
//!
//! Provides consistent URL handling across the codebase:
//! - Query string stripping (tag dedup keys, local file lookups)
//! - Remote URL detection (passthrough assets)
//! - Relative `url()` classification inside stylesheets

/// Strip the query string (and anything after it) from a reference.
///
/// # Examples
/// ```ignore
/// assert_eq!(strip_query("/compressed/a.css?1700000000"), "/compressed/a.css");
/// assert_eq!(strip_query("app.js"), "app.js");
/// ```
#[inline]
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Split a stylesheet `url()` target into path and suffix (`?query` or `#fragment`).
///
/// # Examples
/// ```ignore
/// assert_eq!(split_path_suffix("font.woff2?v=3#x"), ("font.woff2", "?v=3#x"));
/// assert_eq!(split_path_suffix("img/a.png"), ("img/a.png", ""));
/// ```
#[inline]
pub fn split_path_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

/// Check if a reference is a remote `http:`/`https:` URL.
///
/// Remote references are never read from disk; they pass through to the
/// rendered output untouched.
#[inline]
pub fn is_remote_url(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

/// Check if a link is external (has a URL scheme like http:, data:, etc.)
///
/// A valid scheme must:
/// - Have at least 2 characters before the colon (so `C:\` is not a scheme)
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 1
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if a stylesheet `url()` target is relative to the stylesheet itself.
///
/// Root-relative (`/img/a.png`), protocol-relative (`//cdn/x.png`),
/// fragment-only (`#filter`) and scheme URLs (`data:`, `https:`) are not.
#[inline]
pub fn is_stylesheet_relative(url: &str) -> bool {
    !url.is_empty() && !url.starts_with(['/', '#', '\\']) && !is_external_link(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("a.css?x=1"), "a.css");
        assert_eq!(strip_query("a.css?"), "a.css");
        assert_eq!(strip_query("a.css"), "a.css");
        assert_eq!(
            strip_query("https://cdn.example.com/a.js?v=2&x=1"),
            "https://cdn.example.com/a.js"
        );
    }

    #[test]
    fn test_split_path_suffix() {
        assert_eq!(split_path_suffix("a.png?v=1"), ("a.png", "?v=1"));
        assert_eq!(split_path_suffix("a.svg#icon"), ("a.svg", "#icon"));
        assert_eq!(split_path_suffix("a.png"), ("a.png", ""));
    }

    #[test]
    fn test_is_remote_url() {
        assert!(is_remote_url("https://cdn.example.com/x.js"));
        assert!(is_remote_url("http://cdn.example.com/x.css"));
        assert!(is_remote_url("HTTPS://cdn.example.com/x.css"));
        assert!(!is_remote_url("//cdn.example.com/x.css"));
        assert!(!is_remote_url("css/http.css"));
        assert!(!is_remote_url("ftp://example.com/x.js"));
    }

    #[test]
    fn test_is_stylesheet_relative() {
        assert!(is_stylesheet_relative("img/a.png"));
        assert!(is_stylesheet_relative("../fonts/a.woff2"));
        assert!(!is_stylesheet_relative("/img/a.png"));
        assert!(!is_stylesheet_relative("//cdn/a.png"));
        assert!(!is_stylesheet_relative("#clip"));
        assert!(!is_stylesheet_relative("data:image/png;base64,AAAA"));
        assert!(!is_stylesheet_relative("https://example.com/a.png"));
        assert!(!is_stylesheet_relative(""));
    }
}
