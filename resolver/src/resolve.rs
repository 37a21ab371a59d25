//! Forward name resolution
//!
//! Resolution order for a cache miss:
//!
//! 1. observe the chain head, dropping entries of an older digest;
//! 2. look the name up in the attested snapshot;
//! 3. failing that, query the name directly, but only from an endpoint whose
//!    chain identity checks out.
//!
//! Attested answers, including "not registered", outlive unattested ones.
//! Transient failures are never cached.

use std::sync::Arc;

use log::debug;
use xid_attest_core::{Domain, ResolveEntry, ReverseEntry};

use crate::context::ChainContext;
use crate::head::HeadDigestTracker;
use crate::identity::ChainIdentityVerifier;
use crate::snapshot::SnapshotFetcher;

/// Resolves `name.tld` to a site address
#[derive(Debug, Clone)]
pub struct NameResolver {
    ctx: ChainContext,
    head: Arc<HeadDigestTracker>,
    snapshot: Arc<SnapshotFetcher>,
    identity: Arc<ChainIdentityVerifier>,
}

impl NameResolver {
    /// Create a resolver over `ctx`
    pub fn new(
        ctx: ChainContext,
        head: Arc<HeadDigestTracker>,
        snapshot: Arc<SnapshotFetcher>,
        identity: Arc<ChainIdentityVerifier>,
    ) -> Self {
        Self { ctx, head, snapshot, identity }
    }

    /// Site address for `domain`, absent when unregistered or unknown
    pub async fn resolve(&self, domain: &str) -> Option<String> {
        self.resolve_entry(domain).await.and_then(|entry| entry.address)
    }

    /// Full resolution for `domain`
    ///
    /// `None` means the answer could not be determined. A malformed domain is
    /// rejected without touching the network.
    pub async fn resolve_entry(&self, domain: &str) -> Option<ResolveEntry> {
        let domain = Domain::parse(domain)?;
        self.resolve_domain(&domain).await
    }

    /// Full resolution for an already parsed domain
    pub async fn resolve_domain(&self, domain: &Domain) -> Option<ResolveEntry> {
        let key = domain.key();

        if let Some(entry) = self.ctx.cache.resolve_entry(&key) {
            if entry.is_fresh(self.ctx.age(entry.observed_at), &self.ctx.config) {
                return Some(entry);
            }
        }

        if self.head.current().await.is_none() {
            debug!("Head digest unavailable while resolving {}", key);
        }

        if let Some(snapshot) = self.snapshot.attested_mappings().await {
            let address = snapshot.lookup(&key);
            let entry = ResolveEntry::attested(&key, address.clone(), &snapshot.digest, self.ctx.now());
            self.ctx.cache.put_resolve_entry(entry.clone());

            if let Some(address) = address {
                debug!("Resolved {} to {} (attested)", key, address);
                self.ctx.cache.put_reverse_entry(ReverseEntry {
                    address,
                    domain: key,
                    digest: snapshot.digest,
                });
            }
            return Some(entry);
        }

        if !self.identity.verify().await {
            debug!("Refusing direct query for {}: chain identity not verified", key);
            return None;
        }

        self.resolve_direct(domain).await
    }

    async fn resolve_direct(&self, domain: &Domain) -> Option<ResolveEntry> {
        let key = domain.key();
        let api = &self.ctx.api;

        let record = api.resolve_name(domain.tld(), domain.name()).await?;
        if record.existing_record().is_none() {
            let entry = ResolveEntry::unattested(&key, None, self.ctx.now());
            self.ctx.cache.put_resolve_entry(entry.clone());
            return Some(entry);
        }

        let dns = api.dns_records(domain.tld(), domain.name()).await?;
        let address = dns.site_address(self.ctx.config.record_type);
        if let Some(address) = &address {
            debug!("Resolved {} to {} (unattested)", key, address);
        }

        let entry = ResolveEntry::unattested(&key, address, self.ctx.now());
        self.ctx.cache.put_resolve_entry(entry.clone());
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use serde_json::json;
    use xid_attest_core::Trust;

    fn unattested_chain(h: &Harness) {
        h.chain.respond(NODE_INFO, node_info_doc("epix_1916-1"));
        h.chain.respond(STATE_DIGEST, digest_doc("d1", 100));
        h.chain.fail(SNAPSHOT);
    }

    #[tokio::test]
    async fn test_attested_answer_lives_300s() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));
        let names = h.resolver.names();

        let entry = names.resolve_entry("alice.epix").await.unwrap();
        assert_eq!(entry.address.as_deref(), Some("epix1aaaa"));
        assert_eq!(entry.trust, Trust::Attested);
        assert_eq!(entry.digest, "d1");

        h.chain.reset_calls();
        h.clock.advance_secs(100);
        assert_eq!(names.resolve("alice.epix").await.as_deref(), Some("epix1aaaa"));
        h.clock.advance_secs(199);
        assert_eq!(names.resolve("alice.epix").await.as_deref(), Some("epix1aaaa"));
        assert_eq!(h.chain.total_calls(), 0);

        h.clock.advance_secs(1);
        names.resolve("alice.epix").await;
        assert!(h.chain.calls_to(STATE_DIGEST) >= 1);
    }

    #[tokio::test]
    async fn test_unattested_answer_lives_30s() {
        let h = Harness::new();
        unattested_chain(&h);
        h.chain.respond(&resolve_path("epix", "bob"), name_record_doc("bob"));
        h.chain.respond(&dns_path("epix", "bob"), dns_doc("epix1bbbb"));
        let names = h.resolver.names();

        let entry = names.resolve_entry("bob.epix").await.unwrap();
        assert_eq!(entry.address.as_deref(), Some("epix1bbbb"));
        assert_eq!(entry.trust, Trust::Unattested);

        h.clock.advance_secs(29);
        names.resolve("bob.epix").await;
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "bob")), 1);

        h.clock.advance_secs(1);
        names.resolve("bob.epix").await;
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "bob")), 2);
    }

    #[tokio::test]
    async fn test_attested_negative_is_cached() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));
        let names = h.resolver.names();

        let entry = names.resolve_entry("nobody.epix").await.unwrap();
        assert!(entry.address.is_none());
        assert_eq!(entry.trust, Trust::Attested);

        h.chain.reset_calls();
        h.clock.advance_secs(200);
        assert!(names.resolve("nobody.epix").await.is_none());
        assert_eq!(h.chain.total_calls(), 0);
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "nobody")), 0);
    }

    #[tokio::test]
    async fn test_unregistered_name_cached_unattested() {
        let h = Harness::new();
        unattested_chain(&h);
        h.chain.respond(&resolve_path("epix", "ghost"), json!({"record": null}));
        let names = h.resolver.names();

        let entry = names.resolve_entry("ghost.epix").await.unwrap();
        assert!(entry.address.is_none());
        assert_eq!(entry.trust, Trust::Unattested);
        assert_eq!(h.chain.calls_to(&dns_path("epix", "ghost")), 0);

        names.resolve("ghost.epix").await;
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "ghost")), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_not_cached() {
        let h = Harness::new();
        unattested_chain(&h);
        h.chain.fail(&resolve_path("epix", "bob"));
        let names = h.resolver.names();

        assert!(names.resolve_entry("bob.epix").await.is_none());
        assert!(h.context().cache.resolve_entry("bob.epix").is_none());

        h.chain.respond(&resolve_path("epix", "bob"), name_record_doc("bob"));
        h.chain.respond(&dns_path("epix", "bob"), dns_doc("epix1bbbb"));
        assert_eq!(names.resolve("bob.epix").await.as_deref(), Some("epix1bbbb"));
    }

    #[tokio::test]
    async fn test_identity_gate_blocks_direct_query() {
        let h = Harness::new();
        unattested_chain(&h);
        h.chain.respond(NODE_INFO, node_info_doc("cosmoshub-4"));
        h.chain.respond(&resolve_path("epix", "bob"), name_record_doc("bob"));

        assert!(h.resolver.names().resolve("bob.epix").await.is_none());
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "bob")), 0);
    }

    #[tokio::test]
    async fn test_attested_answer_preferred() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1attested")], None));
        h.chain.respond(&resolve_path("epix", "alice"), name_record_doc("alice"));
        h.chain.respond(&dns_path("epix", "alice"), dns_doc("epix1direct"));

        let entry = h.resolver.names().resolve_entry("alice.epix").await.unwrap();
        assert_eq!(entry.address.as_deref(), Some("epix1attested"));
        assert_eq!(h.chain.calls_to(&resolve_path("epix", "alice")), 0);
    }

    #[tokio::test]
    async fn test_malformed_domain_never_queried() {
        let h = Harness::new();
        h.chain.healthy("d1");
        let names = h.resolver.names();

        assert!(names.resolve("").await.is_none());
        assert!(names.resolve("nodot").await.is_none());
        assert!(names.resolve(".epix").await.is_none());
        assert_eq!(h.chain.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_domain_is_normalized() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));

        let entry = h.resolver.names().resolve_entry("  Alice.EPIX ").await.unwrap();
        assert_eq!(entry.domain, "alice.epix");
        assert_eq!(entry.address.as_deref(), Some("epix1aaaa"));
    }

    #[tokio::test]
    async fn test_head_change_invalidates_resolution() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1old")], None));
        let names = h.resolver.names();
        assert_eq!(names.resolve("alice.epix").await.as_deref(), Some("epix1old"));

        h.chain.healthy("d2");
        h.chain.respond(SNAPSHOT, snapshot_doc("d2", &[("alice.epix", "epix1new")], None));
        h.clock.advance_secs(16);

        // a miss on another name observes the new head
        names.resolve("bob.epix").await;
        assert!(h.context().cache.resolve_entry("alice.epix").map_or(true, |e| e.digest == "d2"));
        assert_eq!(names.resolve("alice.epix").await.as_deref(), Some("epix1new"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_all_succeed() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));
        let names = h.resolver.names().clone();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let names = names.clone();
            tasks.push(tokio::spawn(async move { names.resolve("alice.epix").await }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().as_deref(), Some("epix1aaaa"));
        }

        // no request coalescing: concurrent misses may each walk the snapshot
        let walks = h.chain.calls_to(SNAPSHOT);
        assert!((1..=8).contains(&walks));
    }
}
