//! Data models for attested name resolution
//!
//! This module provides the values kept in the resolver caches: domains,
//! chain head digests, finality records and resolution outcomes tagged with
//! the trust level and digest they were obtained under.

mod domain;
mod chain;
mod entry;

pub use domain::{is_managed_domain, Domain};
pub use chain::{AttestationRecord, HeadDigest, IdentityRecord};
pub use entry::{NameRecordEntry, ResolveEntry, ReverseEntry, SnapshotCache, Trust};
