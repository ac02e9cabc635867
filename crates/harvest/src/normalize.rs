// ABOUTME: Cleans raw name/href strings pulled from a candidate node.
// ABOUTME: Collapses whitespace, resolves root-relative links against the site origin, rejects bad links.

//! Record normalization.
//!
//! Key behaviors:
//! - Whitespace runs in names collapse to a single space; ends are trimmed.
//! - Links beginning with `/` are prefixed with the site origin.
//! - Already-absolute links pass through unchanged.
//! - A link that is not an absolute URL with a host does not resolve.

use url::Url;

/// Collapses runs of whitespace into single spaces and trims both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves `href` against `origin` when it is root-relative.
///
/// Returns `None` when the result is not an absolute URL with a host.
pub fn resolve_link(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let link = if href.starts_with('/') && !href.starts_with("//") {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&link).ok()?;
    parsed.host_str()?;
    Some(link)
}

/// Scheme + host (+ explicit port) of `url`, e.g. `https://github.com`.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}", parsed.scheme(), host)),
    }
}
