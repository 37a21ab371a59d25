//! Error types for the core crate
//!
//! Resolution never fails with an error: an unresolvable name is simply
//! absent. The errors here cover configuration handling and the one path
//! where a rejection must be explicit, chain-attested content verification.

use thiserror::Error;

use crate::utils::short_digest;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed domain name
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// Rejection raised when chain-attested content cannot be trusted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The content declares chain attestation but carries no digest
    #[error("Chain attestation content missing state_digest")]
    MissingStateDigest,

    /// The chain head could not be fetched, so nothing can be compared
    #[error("Chain attestation: could not fetch state digest from chain")]
    HeadUnavailable,

    /// The content was produced against a different chain state
    #[error(
        "Chain attestation: content digest {}... does not match chain digest {}...",
        short_digest(.claimed),
        short_digest(.chain)
    )]
    DigestMismatch {
        /// Digest declared by the content
        claimed: String,
        /// Digest currently reported by the chain
        chain: String,
    },

    /// The digest has not been attested by a validator supermajority yet
    #[error("Chain attestation: digest {}... not yet finalized", short_digest(.digest))]
    NotFinalized {
        /// Digest that failed the finality check
        digest: String,
    },
}
