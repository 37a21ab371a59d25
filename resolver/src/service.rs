//! Resolver facade
//!
//! Wires the components around one shared cache and exposes the operations a
//! host needs: forward and reverse resolution, content verification and the
//! administrative cache flush.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};
use xid_attest_client::{HttpFetcher, JsonFetcher};
use xid_attest_core::{Clock, ResolveEntry, ResolverConfig, SystemClock};

use crate::attestation::AttestationChecker;
use crate::content::ContentVerifier;
use crate::context::ChainContext;
use crate::head::HeadDigestTracker;
use crate::identity::ChainIdentityVerifier;
use crate::resolve::NameResolver;
use crate::reverse::ReverseResolver;
use crate::site::SiteDirectory;
use crate::snapshot::SnapshotFetcher;
use crate::strategy::{ResolverChain, XidStrategy};

/// Response of the cache flush operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    /// Number of cached resolutions removed
    pub cleared: usize,
}

/// Chain-attested xID resolver
#[derive(Debug, Clone)]
pub struct XidResolver {
    ctx: ChainContext,
    identity: Arc<ChainIdentityVerifier>,
    head: Arc<HeadDigestTracker>,
    attestation: Arc<AttestationChecker>,
    snapshot: Arc<SnapshotFetcher>,
    names: Arc<NameResolver>,
    reverse: Arc<ReverseResolver>,
    content: Arc<ContentVerifier>,
}

impl XidResolver {
    /// Create a resolver talking HTTP to `config.rpc_url`
    pub fn new(config: ResolverConfig, sites: Arc<dyn SiteDirectory>) -> Self {
        let fetcher = HttpFetcher::new(config.request_timeout());
        Self::with_parts(config, Arc::new(fetcher), Arc::new(SystemClock), sites)
    }

    /// Create a resolver from explicit collaborators
    pub fn with_parts(
        config: ResolverConfig,
        fetcher: Arc<dyn JsonFetcher>,
        clock: Arc<dyn Clock>,
        sites: Arc<dyn SiteDirectory>,
    ) -> Self {
        let ctx = ChainContext::new(config, fetcher, clock);

        let identity = Arc::new(ChainIdentityVerifier::new(ctx.clone()));
        let head = Arc::new(HeadDigestTracker::new(ctx.clone()));
        let attestation = Arc::new(AttestationChecker::new(ctx.clone()));
        let snapshot = Arc::new(SnapshotFetcher::new(ctx.clone(), attestation.clone()));
        let names = Arc::new(NameResolver::new(
            ctx.clone(),
            head.clone(),
            snapshot.clone(),
            identity.clone(),
        ));
        let reverse = Arc::new(ReverseResolver::new(ctx.clone(), names.clone(), sites.clone()));
        let content = Arc::new(ContentVerifier::new(
            ctx.clone(),
            head.clone(),
            attestation.clone(),
            sites,
        ));

        Self {
            ctx,
            identity,
            head,
            attestation,
            snapshot,
            names,
            reverse,
            content,
        }
    }

    /// Shared context
    pub fn context(&self) -> &ChainContext {
        &self.ctx
    }

    /// Resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.ctx.config
    }

    /// Chain identity verifier
    pub fn identity(&self) -> &Arc<ChainIdentityVerifier> {
        &self.identity
    }

    /// Head digest tracker
    pub fn head(&self) -> &Arc<HeadDigestTracker> {
        &self.head
    }

    /// Finality checker
    pub fn attestation(&self) -> &Arc<AttestationChecker> {
        &self.attestation
    }

    /// Snapshot fetcher
    pub fn snapshot(&self) -> &Arc<SnapshotFetcher> {
        &self.snapshot
    }

    /// Forward resolver
    pub fn names(&self) -> &Arc<NameResolver> {
        &self.names
    }

    /// Reverse resolver
    pub fn reverse(&self) -> &Arc<ReverseResolver> {
        &self.reverse
    }

    /// Content verifier
    pub fn content(&self) -> &Arc<ContentVerifier> {
        &self.content
    }

    /// Site address for `domain`
    pub async fn resolve(&self, domain: &str) -> Option<String> {
        self.names.resolve(domain).await
    }

    /// Full resolution for `domain`
    pub async fn resolve_entry(&self, domain: &str) -> Option<ResolveEntry> {
        self.names.resolve_entry(domain).await
    }

    /// Verified domain of the site at `address`
    pub async fn reverse_lookup(&self, address: &str) -> Option<String> {
        self.reverse.reverse_lookup(address).await
    }

    /// Strategy serving the managed TLD
    pub fn strategy(&self) -> XidStrategy {
        XidStrategy::new(self.names.clone(), self.reverse.clone(), &self.ctx.config.managed_tld)
    }

    /// Strategy chain with this resolver registered
    pub fn resolver_chain(&self) -> ResolverChain {
        ResolverChain::new().with_strategy(Arc::new(self.strategy()))
    }

    /// Drop every cached entry
    pub fn clear_cache(&self) -> ClearCacheResponse {
        let cleared = self.ctx.cache.clear_all();
        info!("xID caches cleared: {} resolutions", cleared);
        ClearCacheResponse { cleared }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::StaticSiteDirectory;
    use crate::test_support::*;
    use serde_json::json;
    use xid_attest_core::Trust;

    #[tokio::test]
    async fn test_clear_cache_reports_count() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(
            SNAPSHOT,
            snapshot_doc("d1", &[("alice.epix", "epix1aaaa"), ("bob.epix", "epix1bbbb")], None),
        );
        h.resolver.resolve("alice.epix").await.unwrap();

        // both snapshot mappings were cached, not only the one asked for
        assert_eq!(h.resolver.clear_cache(), ClearCacheResponse { cleared: 2 });
        assert_eq!(h.resolver.clear_cache().cleared, 0);

        h.chain.reset_calls();
        h.resolver.resolve("alice.epix").await.unwrap();
        assert_eq!(h.chain.calls_to(SNAPSHOT), 1);
    }

    #[test]
    fn test_clear_cache_response_json() {
        let body = serde_json::to_value(ClearCacheResponse { cleared: 3 }).unwrap();
        assert_eq!(body, json!({"cleared": 3}));
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let mut server = mockito::Server::new_async().await;
        let body = |value: serde_json::Value| value.to_string();

        let _node = server
            .mock("GET", "/cosmos/base/tendermint/v1beta1/node_info")
            .with_status(200)
            .with_body(body(node_info_doc("epix_1916-1")))
            .create_async()
            .await;
        let _digest = server
            .mock("GET", "/xid/v1/state_digest")
            .with_status(200)
            .with_body(body(digest_doc("abc123", 100)))
            .create_async()
            .await;
        let _attestation = server
            .mock("GET", "/xid/v1/attestations")
            .match_query(mockito::Matcher::UrlEncoded("digest".into(), "abc123".into()))
            .with_status(200)
            .with_body(body(json!({"finalized": true})))
            .create_async()
            .await;
        let snapshot = server
            .mock("GET", "/xid/v1/state_snapshot")
            .with_status(200)
            .with_body(body(snapshot_doc("abc123", &[("alice.epix", "epix1aaaa")], None)))
            .expect(1)
            .create_async()
            .await;

        let sites = Arc::new(StaticSiteDirectory::new());
        sites.insert("epix1aaaa", json!({"domain": "alice.epix"}));
        let resolver = XidResolver::new(ResolverConfig::new().with_rpc_url(&server.url()), sites);

        let entry = resolver.resolve_entry("Alice.EPIX").await.unwrap();
        assert_eq!(entry.address.as_deref(), Some("epix1aaaa"));
        assert_eq!(entry.trust, Trust::Attested);
        assert_eq!(entry.digest, "abc123");

        assert_eq!(resolver.reverse_lookup("epix1aaaa").await.as_deref(), Some("alice.epix"));
        assert_eq!(resolver.resolve("alice.epix").await.as_deref(), Some("epix1aaaa"));
        snapshot.assert_async().await;
    }
}
