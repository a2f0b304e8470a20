//! HTTP cache control module
//!
//! Provides `ETag` generation, HTTP date handling, conditional request
//! checks and the cache policies applied to home responses.

use chrono::{DateTime, Utc};
use hyper::http::response::Builder;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// `Expires` value sent with no-cache responses
const EXPIRED_DATE: &str = "Fri, 01 Jan 1990 00:00:00 GMT";

/// Generate `ETag` using fast hashing
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma separated list and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Whether a resource modified at `modified` is unchanged since the client's
/// `If-Modified-Since` value (compared at one-second resolution)
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}

/// Cache policy attached to a home response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds), validated by `ETag`
    /// and `Last-Modified`
    Public(u32),
    /// Always stale: the client must fetch again on every request
    NoCache,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache, no-store, max-age=0, must-revalidate".to_string(),
        }
    }

    /// Whether validators (`ETag`, `Last-Modified`) and 304 responses apply
    pub const fn is_cacheable(self) -> bool {
        matches!(self, Self::Public(_))
    }

    /// Add this policy's headers to a response builder
    pub fn apply(self, builder: Builder) -> Builder {
        let builder = builder.header("Cache-Control", self.to_header_value());
        match self {
            Self::Public(_) => builder,
            Self::NoCache => builder
                .header("Pragma", "no-cache")
                .header("Expires", EXPIRED_DATE),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600) // 1 hour
    }
}
