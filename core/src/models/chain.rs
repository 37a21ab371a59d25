//! Chain state observations
//!
//! Values fetched from the chain that describe the chain itself rather than
//! any name: the current head digest, finality of a digest, and whether the
//! endpoint is the expected chain at all.

use std::time::{Duration, Instant};

/// The chain's current committed state fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadDigest {
    /// Opaque state digest
    pub digest: String,

    /// Block height the digest was computed at
    pub height: u64,

    /// Number of name records covered by the digest
    pub record_count: u64,

    /// When the digest was fetched
    pub observed_at: Instant,
}

/// Finality status of one digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRecord {
    /// Digest the record describes
    pub digest: String,

    /// Whether at least two thirds of validators attested the digest
    pub finalized: bool,

    /// When the status was fetched
    pub observed_at: Instant,
}

impl AttestationRecord {
    /// Whether the record can answer without asking the chain again
    ///
    /// Finality is permanent, so a finalized record never expires.
    pub fn is_reusable(&self, age: Duration, ttl: Duration) -> bool {
        self.finalized || age < ttl
    }
}

/// Outcome of the last chain identity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Network identifier advertised by the endpoint, if it answered
    pub chain_id: Option<String>,

    /// Whether the identifier matched the expected prefix
    pub verified: bool,

    /// When the check ran
    pub observed_at: Instant,
}
