//! Domain names
//!
//! A domain is split on its last dot into a name and a TLD, both lowercased.
//! `Alice.EPIX` and `alice.epix` are the same domain.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::error::CoreError;

/// Shape of a name accepted by a chain-backed resolver strategy
const DOMAIN_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9\-]*\.[a-zA-Z]+$";

fn domain_regex() -> &'static Regex {
    static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
    DOMAIN_RE.get_or_init(|| Regex::new(DOMAIN_PATTERN).unwrap_or_else(|e| panic!("invalid domain pattern: {e}")))
}

/// A name within a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    /// Label(s) left of the last dot
    name: String,

    /// Label right of the last dot
    tld: String,
}

impl Domain {
    /// Parse a domain, normalizing case
    ///
    /// Returns `None` when there is no dot or either side is empty.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        let (name, tld) = lowered.rsplit_once('.')?;
        if name.is_empty() || tld.is_empty() {
            return None;
        }
        Some(Domain {
            name: name.to_string(),
            tld: tld.to_string(),
        })
    }

    /// Name part
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level domain
    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Cache key, `name.tld`
    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.tld)
    }

    /// Whether the domain belongs to the given TLD
    pub fn is_in(&self, tld: &str) -> bool {
        self.tld.eq_ignore_ascii_case(tld)
    }
}

impl FromStr for Domain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::parse(s).ok_or_else(|| CoreError::InvalidDomain(s.to_string()))
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.name, self.tld)
    }
}

/// Whether `address` looks like a single-label domain under `tld`
pub fn is_managed_domain(address: &str, tld: &str) -> bool {
    if !domain_regex().is_match(address) {
        return false;
    }
    match address.rsplit_once('.') {
        Some((_, suffix)) => suffix.eq_ignore_ascii_case(tld),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice.epix", "alice", "epix")]
    #[case("Alice.EPIX", "alice", "epix")]
    #[case("  bob.Epix ", "bob", "epix")]
    #[case("blog.alice.epix", "blog.alice", "epix")]
    fn test_parse_normalizes(#[case] input: &str, #[case] name: &str, #[case] tld: &str) {
        let domain = Domain::parse(input).unwrap();
        assert_eq!(domain.name(), name);
        assert_eq!(domain.tld(), tld);
        assert_eq!(domain.key(), format!("{}.{}", name, tld));
    }

    #[rstest]
    #[case("alice")]
    #[case("alice.")]
    #[case(".epix")]
    #[case("")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        assert!(Domain::parse(input).is_none());
        assert!(input.parse::<Domain>().is_err());
    }

    #[rstest]
    #[case("alice.epix", true)]
    #[case("Alice.EPIX", true)]
    #[case("my-site.epix", true)]
    #[case("-bad.epix", false)]
    #[case("alice.bit", false)]
    #[case("blog.alice.epix", false)]
    #[case("epix1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq", false)]
    fn test_is_managed_domain(#[case] address: &str, #[case] expected: bool) {
        assert_eq!(is_managed_domain(address, "epix"), expected);
    }

    #[test]
    fn test_display_and_is_in() {
        let domain: Domain = "Alice.Epix".parse().unwrap();
        assert_eq!(domain.to_string(), "alice.epix");
        assert!(domain.is_in("EPIX"));
        assert!(!domain.is_in("bit"));
    }
}
