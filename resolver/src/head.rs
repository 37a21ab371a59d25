//! Head digest tracking
//!
//! The head digest fingerprints the whole name registry. Whenever a different
//! digest is observed, every cache entry anchored to another digest is dropped
//! before the new head is handed to callers.

use log::{debug, info};
use xid_attest_client::ChainApi;
use xid_attest_core::utils::short_digest;
use xid_attest_core::{Clock, HeadDigest};

use crate::context::ChainContext;

/// Read the current head digest from `api` without caching
///
/// Returns `None` when the endpoint fails or reports an empty digest.
pub async fn fetch_head(api: &ChainApi, clock: &dyn Clock) -> Option<HeadDigest> {
    let response = api.state_digest().await?;
    if response.digest.is_empty() {
        debug!("Chain at {} reported an empty state digest", api.base_url());
        return None;
    }

    Some(HeadDigest {
        digest: response.digest,
        height: response.height,
        record_count: response.num_names,
        observed_at: clock.now(),
    })
}

/// Tracks the chain head and invalidates caches when it moves
#[derive(Debug, Clone)]
pub struct HeadDigestTracker {
    ctx: ChainContext,
}

impl HeadDigestTracker {
    /// Create a tracker over `ctx`
    pub fn new(ctx: ChainContext) -> Self {
        Self { ctx }
    }

    /// Current head digest
    ///
    /// Served from cache within the head TTL. Otherwise the chain is asked and
    /// a changed digest triggers invalidation. Returns `None` when the chain
    /// cannot be reached; an expired head is never served.
    pub async fn current(&self) -> Option<HeadDigest> {
        if let Some(head) = self.ctx.cache.head() {
            if self.ctx.age(head.observed_at) < self.ctx.config.head_digest_ttl() {
                return Some(head);
            }
        }

        let head = fetch_head(&self.ctx.api, self.ctx.clock.as_ref()).await?;
        let previous = self.ctx.cache.replace_head(head.clone());

        if previous.map_or(true, |p| p.digest != head.digest) {
            let removed = self.ctx.cache.invalidate_for_new_digest(&head.digest);
            info!(
                "Chain head now {}... at height {} ({} names); dropped {} cached resolutions",
                short_digest(&head.digest),
                head.height,
                head.record_count,
                removed
            );
        }

        Some(head)
    }
}
