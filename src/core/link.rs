// src/core/link.rs
use url::Url;

/// Resolve a raw `href` into the absolute URL used as an item's identity.
///
/// Relative forms (`/p/1`, `p/1`, `//host/p/1`) are resolved against
/// `page_url`. Blank input, unparseable input, and anything that is not
/// http(s) (e.g. `javascript:`) give `None` and must not become a key.
pub fn canonical_link(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = match Url::parse(href) {
        Ok(abs) => abs,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(page_url.trim()).ok()?.join(href).ok()?
        }
        Err(_) => return None,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.into()),
        _ => None,
    }
}
