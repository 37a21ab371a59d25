//! Error types for the resolver service
//!
//! Resolution itself never errors; these cover loading settings and running
//! the admin service.

use std::io;
use std::net::AddrParseError;
use thiserror::Error;
use xid_attest_core::CoreError;

/// Result type for the resolver service
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Error type for the resolver service
#[derive(Debug, Error)]
pub enum ResolverError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Settings could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Settings were read but are invalid
    #[error("Invalid configuration: {0}")]
    Core(#[from] CoreError),

    /// Address parsing error
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] AddrParseError),
}
