//! Typed access to the chain REST endpoints
//!
//! Every method returns `None` when the endpoint could not be reached or the
//! document did not have the expected shape. None of these calls are cached;
//! caching and trust decisions belong to the resolver.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use log::debug;
use reqwest::Url;
use serde::de::DeserializeOwned;
use xid_attest_core::utils::normalize_base_url;

use crate::fetcher::JsonFetcher;
use crate::wire::{
    AttestationResponse, DnsResponse, NodeInfoResponse, ResolveResponse, SnapshotPage,
    StateDigestResponse,
};

/// Path of the node info endpoint
pub const NODE_INFO_PATH: &[&str] = &["cosmos", "base", "tendermint", "v1beta1", "node_info"];

/// Client for one chain REST endpoint
#[derive(Clone)]
pub struct ChainApi {
    /// Base URL for the chain API
    base_url: String,

    /// JSON source
    fetcher: Arc<dyn JsonFetcher>,
}

impl Debug for ChainApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ChainApi").field("base_url", &self.base_url).finish()
    }
}

impl ChainApi {
    /// Create a new client for `base_url`
    pub fn new(base_url: &str, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            fetcher,
        }
    }

    /// Same fetcher, different endpoint
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self::new(base_url, self.fetcher.clone())
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from path segments and an optional query pair
    ///
    /// Segments and query values are percent-encoded.
    pub fn endpoint_url(&self, segments: &[&str], query: Option<(&str, &str)>) -> Option<String> {
        let mut url = match Url::parse(&self.base_url) {
            Ok(url) => url,
            Err(e) => {
                debug!("Invalid chain RPC base URL {}: {}", self.base_url, e);
                return None;
            }
        };

        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            path.extend(segments);
        }

        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }

        Some(url.into())
    }

    /// Advertised node info
    pub async fn node_info(&self) -> Option<NodeInfoResponse> {
        let url = self.endpoint_url(NODE_INFO_PATH, None)?;
        self.get(&url).await
    }

    /// Current state digest
    pub async fn state_digest(&self) -> Option<StateDigestResponse> {
        let url = self.endpoint_url(&["xid", "v1", "state_digest"], None)?;
        self.get(&url).await
    }

    /// Finality status of `digest`
    pub async fn attestation(&self, digest: &str) -> Option<AttestationResponse> {
        let url = self.endpoint_url(&["xid", "v1", "attestations"], Some(("digest", digest)))?;
        self.get(&url).await
    }

    /// Name record of `name.tld`
    pub async fn resolve_name(&self, tld: &str, name: &str) -> Option<ResolveResponse> {
        let url = self.endpoint_url(&["xid", "v1", "resolve", tld, name], None)?;
        self.get(&url).await
    }

    /// DNS records of `name.tld`
    pub async fn dns_records(&self, tld: &str, name: &str) -> Option<DnsResponse> {
        let url = self.endpoint_url(&["xid", "v1", "dns", tld, name], None)?;
        self.get(&url).await
    }

    /// One page of the state snapshot; the first page when `next_key` is `None`
    pub async fn snapshot_page(&self, next_key: Option<&str>) -> Option<SnapshotPage> {
        let query = next_key.map(|key| ("pagination.key", key));
        let url = self.endpoint_url(&["xid", "v1", "state_snapshot"], query)?;
        self.get(&url).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let value = self.fetcher.fetch_json(url).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Malformed xID RPC response from {}: {}", url, e);
                None
            }
        }
    }
}
