//! Chain identity verification
//!
//! Direct (unattested) queries are only trusted when the endpoint advertises a
//! network id belonging to the expected chain. The answer, including a failed
//! check, is cached for the identity TTL.

use log::{debug, warn};
use xid_attest_core::IdentityRecord;

use crate::context::ChainContext;

/// Checks that the configured endpoint serves the expected chain
#[derive(Debug, Clone)]
pub struct ChainIdentityVerifier {
    ctx: ChainContext,
}

impl ChainIdentityVerifier {
    /// Create a verifier over `ctx`
    pub fn new(ctx: ChainContext) -> Self {
        Self { ctx }
    }

    /// Whether the endpoint serves the expected chain
    pub async fn verify(&self) -> bool {
        if let Some(record) = self.cached() {
            return record.verified;
        }

        let chain_id = self
            .ctx
            .api
            .node_info()
            .await
            .and_then(|info| info.network().map(str::to_string));

        let verified = chain_id
            .as_deref()
            .map_or(false, |id| id.starts_with(&self.ctx.config.expected_chain_prefix));

        match &chain_id {
            Some(id) if verified => debug!("Chain identity verified: {}", id),
            Some(id) => warn!(
                "Chain identity mismatch: expected {}*, got {}",
                self.ctx.config.expected_chain_prefix, id
            ),
            None => warn!("Chain identity check failed: no network id from {}", self.ctx.api.base_url()),
        }

        self.ctx.cache.set_identity(IdentityRecord {
            chain_id,
            verified,
            observed_at: self.ctx.now(),
        });
        verified
    }

    /// Network id seen by the last check, if still fresh
    pub fn chain_id(&self) -> Option<String> {
        self.cached().and_then(|record| record.chain_id)
    }

    fn cached(&self) -> Option<IdentityRecord> {
        self.ctx
            .cache
            .identity()
            .filter(|record| self.ctx.age(record.observed_at) < self.ctx.config.identity_ttl())
    }
}
