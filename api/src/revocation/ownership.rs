use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static COMMON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CN=([a-z0-9.\-_]+)$").expect("common name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("distinguished name {dn:?} has no common name")]
pub struct MalformedDn {
    pub dn: String,
}

/// Extract the subject's common name from a distinguished name.
///
/// The `CN=` component must end the DN and hold only lowercase
/// alphanumerics, dots, hyphens and underscores. Anything else is
/// [`MalformedDn`]; there is no empty-name fallback.
pub fn common_name(dn: &str) -> Result<&str, MalformedDn> {
    COMMON_NAME
        .captures(dn)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| MalformedDn { dn: dn.to_string() })
}
