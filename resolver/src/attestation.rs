//! Digest finality checks
//!
//! A digest is finalized once two thirds of validators attested it. Finality
//! never reverts, so a positive answer is cached for the life of the process;
//! negative and failed answers expire after the attestation TTL.

use log::debug;
use xid_attest_client::ChainApi;
use xid_attest_core::utils::short_digest;
use xid_attest_core::AttestationRecord;

use crate::context::ChainContext;

/// Ask `api` whether `digest` is finalized, without caching
///
/// Any failure counts as not finalized.
pub async fn check_finality(api: &ChainApi, digest: &str) -> bool {
    if digest.is_empty() {
        return false;
    }
    api.attestation(digest).await.map_or(false, |r| r.finalized)
}

/// Cached finality lookups
#[derive(Debug, Clone)]
pub struct AttestationChecker {
    ctx: ChainContext,
}

impl AttestationChecker {
    /// Create a checker over `ctx`
    pub fn new(ctx: ChainContext) -> Self {
        Self { ctx }
    }

    /// Whether `digest` has been finalized
    pub async fn is_finalized(&self, digest: &str) -> bool {
        if digest.is_empty() {
            return false;
        }

        if let Some(record) = self.ctx.cache.attestation(digest) {
            let age = self.ctx.age(record.observed_at);
            if record.is_reusable(age, self.ctx.config.attestation_ttl()) {
                return record.finalized;
            }
        }

        let finalized = check_finality(&self.ctx.api, digest).await;
        if !finalized {
            debug!("State digest {}... is not finalized", short_digest(digest));
        }

        self.ctx.cache.record_attestation(AttestationRecord {
            digest: digest.to_string(),
            finalized,
            observed_at: self.ctx.now(),
        });
        finalized
    }
}
