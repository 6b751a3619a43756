//! Security header compliance.
//!
//! Presence only: a header that exists with a weak value still passes.

use axum::http::HeaderMap;
use std::collections::HashMap;

/// Required headers in check order, paired with the finding reported when absent.
pub const REQUIRED_HEADERS: [(&str, &str); 4] = [
    ("content-security-policy", "Missing CSP"),
    ("strict-transport-security", "Missing HSTS"),
    ("x-frame-options", "Missing X-Frame-Options"),
    ("x-content-type-options", "Missing X-Content-Type-Options"),
];

/// Something that can answer "is this lower-cased header present".
pub trait HeaderLookup {
    fn has_header(&self, lower_name: &str) -> bool;
}

impl HeaderLookup for HashMap<String, String> {
    fn has_header(&self, lower_name: &str) -> bool {
        self.contains_key(lower_name)
    }
}

impl HeaderLookup for HeaderMap {
    fn has_header(&self, lower_name: &str) -> bool {
        self.contains_key(lower_name)
    }
}

/// Findings for every required header missing from `headers`, in check order.
pub fn check_headers<H: HeaderLookup + ?Sized>(headers: &H) -> Vec<String> {
    REQUIRED_HEADERS
        .iter()
        .filter(|(name, _)| !headers.has_header(name))
        .map(|(_, finding)| finding.to_string())
        .collect()
}

/// Lower-case the names of a response header map into the plain form the
/// checker and the header fetcher exchange. Non-UTF-8 values are kept lossily.
pub fn to_lowercase_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
