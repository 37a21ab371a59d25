//! Cached resolution outcomes
//!
//! Every entry carries the digest it was obtained under so it can be dropped
//! when the chain head moves. Direct-query results are not anchored to any
//! digest and carry [`UNANCHORED_DIGEST`].

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Serialize, Deserialize};

use crate::config::ResolverConfig;
use crate::UNANCHORED_DIGEST;

/// Trust tier of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trust {
    /// Single direct query against an endpoint whose chain id matched
    Unattested,

    /// Read from a snapshot whose digest was finalized
    Attested,
}

impl Display for Trust {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Trust::Unattested => write!(f, "unattested"),
            Trust::Attested => write!(f, "attested"),
        }
    }
}

/// Cached resolution outcome for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveEntry {
    /// Domain key, `name.tld`
    pub domain: String,

    /// Site address, `None` for a cached negative
    pub address: Option<String>,

    /// How the outcome was obtained
    pub trust: Trust,

    /// Digest the outcome is anchored to
    pub digest: String,

    /// When the outcome was obtained
    pub observed_at: Instant,
}

impl ResolveEntry {
    /// Outcome read from a finalized snapshot
    pub fn attested(domain: &str, address: Option<String>, digest: &str, observed_at: Instant) -> Self {
        ResolveEntry {
            domain: domain.to_string(),
            address,
            trust: Trust::Attested,
            digest: digest.to_string(),
            observed_at,
        }
    }

    /// Outcome of a direct query
    pub fn unattested(domain: &str, address: Option<String>, observed_at: Instant) -> Self {
        ResolveEntry {
            domain: domain.to_string(),
            address,
            trust: Trust::Unattested,
            digest: UNANCHORED_DIGEST.to_string(),
            observed_at,
        }
    }

    /// Lifetime of this entry under the given configuration
    pub fn ttl(&self, config: &ResolverConfig) -> Duration {
        match self.trust {
            Trust::Attested => config.attested_ttl(),
            Trust::Unattested => config.unattested_ttl(),
        }
    }

    /// Whether the entry can still be served
    pub fn is_fresh(&self, age: Duration, config: &ResolverConfig) -> bool {
        age < self.ttl(config)
    }
}

/// Chain-verified address to domain mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseEntry {
    /// Site address
    pub address: String,

    /// Domain key verified to resolve to `address`
    pub domain: String,

    /// Digest the verification is anchored to
    pub digest: String,
}

/// A full attested domain to address table anchored to one digest
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    /// Finalized digest every page of the table was read under
    pub digest: String,

    /// Domain key to site address
    pub mappings: Arc<HashMap<String, String>>,

    /// When the table was last confirmed against the chain
    pub observed_at: Instant,

    /// Set when a different head digest has been observed since
    pub stale: bool,
}

impl SnapshotCache {
    /// Build a freshly confirmed snapshot
    pub fn new(digest: &str, mappings: HashMap<String, String>, observed_at: Instant) -> Self {
        SnapshotCache {
            digest: digest.to_string(),
            mappings: Arc::new(mappings),
            observed_at,
            stale: false,
        }
    }

    /// Whether the table can be served without touching the chain
    pub fn is_fresh(&self, age: Duration, ttl: Duration) -> bool {
        !self.stale && age < ttl
    }
}

/// Raw chain name record cached for a chain-attested site
#[derive(Debug, Clone, PartialEq)]
pub struct NameRecordEntry {
    /// Record as returned by the chain, `None` when the name does not exist
    pub record: Option<serde_json::Value>,

    /// Digest the record was read under
    pub digest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ttl_depends_on_trust() {
        let config = ResolverConfig::default();
        let now = Instant::now();

        let attested = ResolveEntry::attested("alice.epix", Some("epix1a".to_string()), "d1", now);
        let unattested = ResolveEntry::unattested("alice.epix", Some("epix1a".to_string()), now);

        assert!(attested.is_fresh(Duration::from_secs(299), &config));
        assert!(!attested.is_fresh(Duration::from_secs(300), &config));
        assert!(unattested.is_fresh(Duration::from_secs(29), &config));
        assert!(!unattested.is_fresh(Duration::from_secs(30), &config));
    }

    #[test]
    fn test_unattested_entries_are_unanchored() {
        let entry = ResolveEntry::unattested("alice.epix", None, Instant::now());
        assert_eq!(entry.digest, UNANCHORED_DIGEST);
        assert_eq!(entry.trust, Trust::Unattested);
    }

    #[test]
    fn test_stale_snapshot_is_not_fresh() {
        let mut snapshot = SnapshotCache::new("d1", HashMap::new(), Instant::now());
        assert!(snapshot.is_fresh(Duration::from_secs(1), Duration::from_secs(60)));

        snapshot.stale = true;
        assert!(!snapshot.is_fresh(Duration::from_secs(1), Duration::from_secs(60)));
    }

    #[test]
    fn test_trust_serialization() {
        assert_eq!(serde_json::to_string(&Trust::Attested).unwrap(), "\"attested\"");
        assert_eq!(Trust::Unattested.to_string(), "unattested");
    }
}
