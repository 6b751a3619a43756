//! URL normalization.
//!
//! Turns user input into the canonical form used as cache key and job key.
//! Inputs without an `http://` or `https://` prefix get `https://` prepended,
//! then the WHATWG parser decides validity and produces the canonical string.

use serde::{Deserialize, Serialize};
use url::Url;

/// A canonical, absolute `http`/`https` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTarget(String);

impl AuditTarget {
    /// Normalize arbitrary input. `None` marks the input as invalid.
    pub fn parse(input: &str) -> Option<Self> {
        normalize(input).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AuditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuditTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn has_web_scheme(input: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        input
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Canonical string form of `input`, or `None` when it cannot be parsed.
pub fn normalize(input: &str) -> Option<String> {
    let candidate = if has_web_scheme(input) {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    Url::parse(&candidate).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prepends_https() {
        assert_eq!(normalize("example.com").as_deref(), Some("https://example.com/"));
        assert_eq!(
            normalize("example.com/path?q=1").as_deref(),
            Some("https://example.com/path?q=1")
        );
    }

    #[test]
    fn test_keeps_explicit_scheme_case_insensitively() {
        assert_eq!(normalize("http://example.com").as_deref(), Some("http://example.com/"));
        assert_eq!(normalize("HTTP://Example.COM").as_deref(), Some("http://example.com/"));
        assert_eq!(normalize("HtTpS://example.com/a").as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_lowercases_host_and_drops_default_port() {
        assert_eq!(
            normalize("https://WWW.Example.com:443/Path").as_deref(),
            Some("https://www.example.com/Path")
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("::::"), None);
        assert_eq!(normalize("http://"), None);
        assert_eq!(normalize("https://exa mple.com"), None);
        assert!(AuditTarget::parse("::::").is_none());
    }

    #[test]
    fn test_target_serializes_as_plain_string() {
        let target = AuditTarget::parse("example.com").unwrap();
        assert_eq!(serde_json::to_string(&target).unwrap(), "\"https://example.com/\"");
    }

    proptest! {
        #[test]
        fn prop_scheme_less_equals_https_prefixed(s in "[a-z0-9.\\-/?=&]{0,40}") {
            prop_assume!(!has_web_scheme(&s));
            prop_assert_eq!(normalize(&s), normalize(&format!("https://{}", s)));
        }

        #[test]
        fn prop_normalize_is_idempotent(
            host in "[a-z]{1,12}(\\.[a-z]{2,6}){1,2}",
            path in "(/[A-Za-z0-9_\\-.]{0,8}){0,3}",
            scheme in prop::sample::select(vec!["", "http://", "https://", "HTTPS://"]),
        ) {
            let first = normalize(&format!("{}{}{}", scheme, host, path));
            prop_assert!(first.is_some());
            let first = first.unwrap();
            prop_assert_eq!(normalize(&first), Some(first.clone()));
        }

        #[test]
        fn prop_never_panics(s in ".{0,64}") {
            let _ = normalize(&s);
        }

        #[test]
        fn prop_output_is_web_schemed(s in ".{0,64}") {
            if let Some(url) = normalize(&s) {
                prop_assert!(url.starts_with("http://") || url.starts_with("https://"));
            }
        }
    }
}
