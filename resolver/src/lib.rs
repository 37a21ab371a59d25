//! # xID Attest Resolver
//!
//! Resolves `.epix` names to EpixNet site addresses through the xID chain REST
//! API, trusting an answer only as far as the chain backs it:
//!
//! - attested answers come from a full state snapshot whose digest has been
//!   finalized by a validator supermajority;
//! - unattested answers come from a direct query, and only after the endpoint
//!   proved it serves the expected chain;
//! - reverse lookups are accepted only when a forward resolution confirms them.
//!
//! All cache state lives in one [`CacheState`] shared by the components and
//! dropped wholesale by [`XidResolver::clear_cache`].

pub mod api;
pub mod attestation;
pub mod cache;
pub mod content;
pub mod context;
pub mod error;
pub mod head;
pub mod identity;
pub mod resolve;
pub mod reverse;
pub mod service;
pub mod settings;
pub mod site;
pub mod snapshot;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::CacheState;
pub use content::{AttestedContent, ChainAttestationConfig, ContentVerifier};
pub use context::ChainContext;
pub use error::{ResolverError, Result};
pub use resolve::NameResolver;
pub use reverse::ReverseResolver;
pub use service::{ClearCacheResponse, XidResolver};
pub use site::{SiteDirectory, StaticSiteDirectory};
pub use snapshot::{AttestedSnapshot, SnapshotFetcher};
pub use strategy::{DomainStrategy, ResolverChain, XidStrategy};
