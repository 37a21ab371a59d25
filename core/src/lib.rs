//! # xID Attest Core
//!
//! Core data structures and configuration for chain-attested name resolution.
//! This crate holds the vocabulary shared by the RPC client and the resolver:
//! domains, head digests, attestation records, cache entries and the errors
//! surfaced when attested content fails verification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

/// Re-export common types for ease of use
pub use config::ResolverConfig;
pub use error::{CoreError, VerifyError};
pub use models::{
    AttestationRecord, Domain, HeadDigest, IdentityRecord, NameRecordEntry, ResolveEntry,
    ReverseEntry, SnapshotCache, Trust,
};
pub use utils::clock::{Clock, ManualClock, SystemClock};

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// DNS record type carrying an EpixNet site address (private-use range, RFC 6895)
pub const EPIXNET_RECORD_TYPE: u64 = 65280;

/// Digest tag carried by entries that are not anchored to any chain digest
pub const UNANCHORED_DIGEST: &str = "";
