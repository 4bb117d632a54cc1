//! Utility functions and helpers.

pub mod http;
#[cfg(feature = "logger")]
pub mod logging;
pub mod price;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

/// Join a site-relative path onto a store's base URL.
///
/// Unlike [`resolve`], any path on the base is discarded, so
/// `https://shop.example/en` + `/products.json` targets the site root.
pub fn join_path(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match Url::parse(base) {
        Ok(mut url) => {
            url.set_path(path);
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => format!("{base}/{}", path.trim_start_matches('/')),
    }
}

/// Normalize a product link for identity comparison.
///
/// Drops query and fragment, lower-cases scheme and host, and trims a trailing
/// slash. Unparsable input is returned trimmed.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.trim_end_matches('/').to_string(),
    }
}
