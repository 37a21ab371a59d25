//! Resolver cache state
//!
//! Every cache the resolver keeps lives here, each behind its own lock. Locks
//! are taken one at a time and never held across an await point, so readers on
//! one cache never wait on a writer of another. A poisoned lock is recovered:
//! the maps hold plain values and stay consistent even if a holder panicked.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use xid_attest_core::{
    AttestationRecord, HeadDigest, IdentityRecord, NameRecordEntry, ResolveEntry, ReverseEntry,
    SnapshotCache,
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// All caches of one resolver instance
#[derive(Debug, Default)]
pub struct CacheState {
    /// Last chain identity check
    identity: RwLock<Option<IdentityRecord>>,

    /// Last observed head digest
    head: RwLock<Option<HeadDigest>>,

    /// Finality answers keyed by digest
    attestations: RwLock<HashMap<String, AttestationRecord>>,

    /// Forward resolutions keyed by `name.tld`
    resolved: RwLock<HashMap<String, ResolveEntry>>,

    /// Verified reverse mappings keyed by site address
    reverse: RwLock<HashMap<String, ReverseEntry>>,

    /// Last committed attested snapshot
    snapshot: RwLock<Option<SnapshotCache>>,

    /// Raw name records read for chain-attested sites, keyed by `name.tld`
    name_records: RwLock<HashMap<String, NameRecordEntry>>,
}

impl CacheState {
    /// Create empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Last identity check
    pub fn identity(&self) -> Option<IdentityRecord> {
        read(&self.identity).clone()
    }

    /// Store an identity check
    pub fn set_identity(&self, record: IdentityRecord) {
        *write(&self.identity) = Some(record);
    }

    /// Last observed head digest
    pub fn head(&self) -> Option<HeadDigest> {
        read(&self.head).clone()
    }

    /// Store a head digest, returning the one it replaced
    pub fn replace_head(&self, head: HeadDigest) -> Option<HeadDigest> {
        write(&self.head).replace(head)
    }

    /// Cached finality answer for `digest`
    pub fn attestation(&self, digest: &str) -> Option<AttestationRecord> {
        read(&self.attestations).get(digest).cloned()
    }

    /// Store a finality answer
    ///
    /// A finalized record is never replaced.
    pub fn record_attestation(&self, record: AttestationRecord) {
        let mut attestations = write(&self.attestations);
        if attestations.get(&record.digest).map_or(false, |r| r.finalized) {
            return;
        }
        attestations.insert(record.digest.clone(), record);
    }

    /// Cached resolution for `name.tld`
    pub fn resolve_entry(&self, key: &str) -> Option<ResolveEntry> {
        read(&self.resolved).get(key).cloned()
    }

    /// Store a resolution
    pub fn put_resolve_entry(&self, entry: ResolveEntry) {
        write(&self.resolved).insert(entry.domain.clone(), entry);
    }

    /// Verified domain for a site address
    pub fn reverse_entry(&self, address: &str) -> Option<ReverseEntry> {
        read(&self.reverse).get(address).cloned()
    }

    /// Store a verified reverse mapping
    pub fn put_reverse_entry(&self, entry: ReverseEntry) {
        write(&self.reverse).insert(entry.address.clone(), entry);
    }

    /// Last committed snapshot, fresh or not
    pub fn snapshot(&self) -> Option<SnapshotCache> {
        read(&self.snapshot).clone()
    }

    /// Re-confirm the committed snapshot if it is anchored to `digest`
    ///
    /// Returns its mappings when it was, leaving the cache untouched otherwise.
    pub fn touch_snapshot(&self, digest: &str, at: Instant) -> Option<Arc<HashMap<String, String>>> {
        let mut guard = write(&self.snapshot);
        let snapshot = guard.as_mut().filter(|s| s.digest == digest)?;
        snapshot.observed_at = at;
        snapshot.stale = false;
        Some(snapshot.mappings.clone())
    }

    /// Commit a fully walked snapshot
    ///
    /// Drops everything anchored to another digest, replaces the previous
    /// snapshot and records an attested forward and reverse entry for every
    /// mapping. Returns the committed mappings.
    pub fn commit_snapshot(&self, snapshot: SnapshotCache) -> Arc<HashMap<String, String>> {
        let mappings = snapshot.mappings.clone();
        let digest = snapshot.digest.clone();
        let at = snapshot.observed_at;

        self.invalidate_for_new_digest(&digest);
        *write(&self.snapshot) = Some(snapshot);

        {
            let mut resolved = write(&self.resolved);
            for (domain, address) in mappings.iter() {
                resolved.insert(
                    domain.clone(),
                    ResolveEntry::attested(domain, Some(address.clone()), &digest, at),
                );
            }
        }

        {
            let mut reverse = write(&self.reverse);
            for (domain, address) in mappings.iter() {
                reverse.insert(
                    address.clone(),
                    ReverseEntry {
                        address: address.clone(),
                        domain: domain.clone(),
                        digest: digest.clone(),
                    },
                );
            }
        }

        mappings
    }

    /// Cached raw name record
    pub fn name_record(&self, key: &str) -> Option<NameRecordEntry> {
        read(&self.name_records).get(key).cloned()
    }

    /// Store a raw name record
    pub fn put_name_record(&self, key: &str, entry: NameRecordEntry) {
        write(&self.name_records).insert(key.to_string(), entry);
    }

    /// Drop everything anchored to a digest other than `digest`
    ///
    /// Removes resolutions, reverse mappings and name records tagged with any
    /// other digest (unattested entries included) and marks a snapshot of
    /// another digest stale. Returns the number of resolutions removed.
    pub fn invalidate_for_new_digest(&self, digest: &str) -> usize {
        let removed = {
            let mut resolved = write(&self.resolved);
            let before = resolved.len();
            resolved.retain(|_, entry| entry.digest == digest);
            before - resolved.len()
        };

        write(&self.reverse).retain(|_, entry| entry.digest == digest);
        write(&self.name_records).retain(|_, entry| entry.digest == digest);

        if let Some(snapshot) = write(&self.snapshot).as_mut() {
            if snapshot.digest != digest {
                snapshot.stale = true;
            }
        }

        removed
    }

    /// Empty every cache
    ///
    /// Returns the number of resolutions removed.
    pub fn clear_all(&self) -> usize {
        let removed = {
            let mut resolved = write(&self.resolved);
            let count = resolved.len();
            resolved.clear();
            count
        };

        write(&self.reverse).clear();
        write(&self.name_records).clear();
        write(&self.attestations).clear();
        *write(&self.snapshot) = None;
        *write(&self.head) = None;
        *write(&self.identity) = None;

        removed
    }

    /// Number of cached resolutions
    pub fn resolved_len(&self) -> usize {
        read(&self.resolved).len()
    }

    /// Number of cached reverse mappings
    pub fn reverse_len(&self) -> usize {
        read(&self.reverse).len()
    }
}
