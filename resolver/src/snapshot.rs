//! Attested snapshot loading
//!
//! The full domain table is read page by page and only committed when every
//! page carried the same finalized digest. A head move mid-walk restarts the
//! walk; any other failure leaves the previous snapshot in place.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use xid_attest_client::wire::SnapshotPage;
use xid_attest_core::utils::short_digest;
use xid_attest_core::SnapshotCache;

use crate::attestation::AttestationChecker;
use crate::context::ChainContext;

/// A finalized domain to address table
#[derive(Debug, Clone)]
pub struct AttestedSnapshot {
    /// Digest the table is anchored to
    pub digest: String,

    /// Domain key to site address
    pub mappings: Arc<HashMap<String, String>>,
}

impl AttestedSnapshot {
    /// Address for `key`, absent when the attested table has none
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.mappings.get(key).cloned()
    }
}

enum Walk {
    Complete(HashMap<String, String>),
    DigestMoved,
    Unavailable,
}

/// Fetches and caches attested snapshots
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    ctx: ChainContext,
    attestation: Arc<AttestationChecker>,
}

impl SnapshotFetcher {
    /// Create a fetcher over `ctx`
    pub fn new(ctx: ChainContext, attestation: Arc<AttestationChecker>) -> Self {
        Self { ctx, attestation }
    }

    /// The attested table, or `None` when no finalized snapshot is available
    pub async fn attested_mappings(&self) -> Option<AttestedSnapshot> {
        if let Some(snapshot) = self.ctx.cache.snapshot() {
            if snapshot.is_fresh(self.ctx.age(snapshot.observed_at), self.ctx.config.snapshot_ttl()) {
                return Some(AttestedSnapshot {
                    digest: snapshot.digest,
                    mappings: snapshot.mappings,
                });
            }
        }

        let attempts = self.ctx.config.max_snapshot_attempts;
        for attempt in 1..=attempts {
            let first = self.ctx.api.snapshot_page(None).await?;
            if first.digest.is_empty() {
                debug!("State snapshot carried no digest");
                return None;
            }
            let digest = first.digest.clone();

            if let Some(mappings) = self.ctx.cache.touch_snapshot(&digest, self.ctx.now()) {
                return Some(AttestedSnapshot { digest, mappings });
            }

            if !self.attestation.is_finalized(&digest).await {
                debug!("Snapshot digest {}... not finalized yet", short_digest(&digest));
                return None;
            }

            match self.walk(first).await {
                Walk::Complete(mappings) => {
                    let count = mappings.len();
                    let mappings = self
                        .ctx
                        .cache
                        .commit_snapshot(SnapshotCache::new(&digest, mappings, self.ctx.now()));
                    info!(
                        "Loaded attested snapshot: {} EPIXNET mappings (digest: {}...)",
                        count,
                        short_digest(&digest)
                    );
                    return Some(AttestedSnapshot { digest, mappings });
                }
                Walk::DigestMoved => {
                    debug!("Digest changed during pagination (attempt {}/{})", attempt, attempts);
                }
                Walk::Unavailable => return None,
            }
        }

        warn!("Failed to fetch consistent snapshot after {} attempts", attempts);
        None
    }

    async fn walk(&self, first: SnapshotPage) -> Walk {
        let record_type = self.ctx.config.record_type;
        let max_pages = self.ctx.config.max_snapshot_pages;
        let digest = first.digest.clone();

        let mut mappings: HashMap<String, String> = first.mappings(record_type).collect();
        let mut next_key = first.next_key().map(str::to_string);
        let mut pages = 1;

        while let Some(key) = next_key {
            if pages >= max_pages {
                warn!(
                    "Snapshot {}... exceeds {} pages; keeping previous snapshot",
                    short_digest(&digest),
                    max_pages
                );
                return Walk::Unavailable;
            }

            let page = match self.ctx.api.snapshot_page(Some(&key)).await {
                Some(page) => page,
                None => {
                    debug!("Snapshot page {} unavailable", pages + 1);
                    return Walk::Unavailable;
                }
            };
            if page.digest != digest {
                return Walk::DigestMoved;
            }

            mappings.extend(page.mappings(record_type));
            next_key = page.next_key().map(str::to_string);
            pages += 1;
        }

        Walk::Complete(mappings)
    }
}
