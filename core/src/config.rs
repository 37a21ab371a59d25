//! Configuration for attested name resolution
//!
//! This module provides the endpoint, trust and cache settings shared by the
//! RPC client and the resolver. Durations are stored as whole seconds so the
//! configuration reads naturally from files and environment variables.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::error::CoreError;
use crate::utils::normalize_base_url;
use crate::EPIXNET_RECORD_TYPE;

/// Default chain REST API endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.epix.zone";

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Base URL of the chain REST API
    pub rpc_url: String,

    /// Prefix the endpoint's advertised network id must start with
    pub expected_chain_prefix: String,

    /// Top-level domain served by the chain-backed resolver
    pub managed_tld: String,

    /// DNS record type holding the site address
    pub record_type: u64,

    /// Timeout for each HTTP request
    pub request_timeout_secs: u64,

    /// How long a chain identity check is trusted
    pub identity_ttl_secs: u64,

    /// How long the head digest is considered current
    pub head_digest_ttl_secs: u64,

    /// How long a not-finalized attestation answer is cached
    pub attestation_ttl_secs: u64,

    /// How long an attested snapshot is served without re-checking the chain
    pub snapshot_ttl_secs: u64,

    /// Lifetime of resolutions backed by an attested snapshot
    pub attested_ttl_secs: u64,

    /// Lifetime of resolutions obtained by direct query
    pub unattested_ttl_secs: u64,

    /// Upper bound on snapshot pages walked per attempt
    pub max_snapshot_pages: usize,

    /// Snapshot walks retried when the chain head moves mid-pagination
    pub max_snapshot_attempts: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            expected_chain_prefix: "epix_".to_string(),
            managed_tld: "epix".to_string(),
            record_type: EPIXNET_RECORD_TYPE,
            request_timeout_secs: 10,
            identity_ttl_secs: 300,
            head_digest_ttl_secs: 15,
            attestation_ttl_secs: 30,
            snapshot_ttl_secs: 60,
            attested_ttl_secs: 300,
            unattested_ttl_secs: 30,
            max_snapshot_pages: 100,
            max_snapshot_attempts: 3,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration pointing at another endpoint
    pub fn with_rpc_url(mut self, rpc_url: &str) -> Self {
        self.rpc_url = normalize_base_url(rpc_url);
        self
    }

    /// Create a testing configuration
    pub fn for_testing() -> Self {
        Self {
            rpc_url: "http://chain.test".to_string(),
            request_timeout_secs: 2,
            ..Self::default()
        }
    }

    /// Check the configuration for values the resolver cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.rpc_url.trim().is_empty() {
            return Err(CoreError::ConfigError("rpc_url must not be empty".to_string()));
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(CoreError::ConfigError(format!(
                "rpc_url must be an http(s) URL, got '{}'",
                self.rpc_url
            )));
        }
        if self.expected_chain_prefix.is_empty() {
            return Err(CoreError::ConfigError("expected_chain_prefix must not be empty".to_string()));
        }
        if self.managed_tld.is_empty() || self.managed_tld.contains('.') {
            return Err(CoreError::ConfigError(format!(
                "managed_tld must be a single label, got '{}'",
                self.managed_tld
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ConfigError("request_timeout_secs must be positive".to_string()));
        }
        if self.max_snapshot_pages == 0 || self.max_snapshot_attempts == 0 {
            return Err(CoreError::ConfigError(
                "snapshot page and attempt bounds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> String {
        normalize_base_url(&self.rpc_url)
    }

    /// Timeout for each HTTP request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Chain identity cache lifetime
    pub fn identity_ttl(&self) -> Duration {
        Duration::from_secs(self.identity_ttl_secs)
    }

    /// Head digest cache lifetime
    pub fn head_digest_ttl(&self) -> Duration {
        Duration::from_secs(self.head_digest_ttl_secs)
    }

    /// Not-finalized attestation cache lifetime
    pub fn attestation_ttl(&self) -> Duration {
        Duration::from_secs(self.attestation_ttl_secs)
    }

    /// Snapshot cache lifetime
    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }

    /// Attested resolution lifetime
    pub fn attested_ttl(&self) -> Duration {
        Duration::from_secs(self.attested_ttl_secs)
    }

    /// Unattested resolution lifetime
    pub fn unattested_ttl(&self) -> Duration {
        Duration::from_secs(self.unattested_ttl_secs)
    }
}
