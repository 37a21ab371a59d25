//! Pluggable domain resolution strategies
//!
//! A host can serve several naming systems. Each one is a [`DomainStrategy`];
//! the [`ResolverChain`] asks them in registration order and takes the first
//! answer.

use std::sync::Arc;

use async_trait::async_trait;
use xid_attest_core::models::is_managed_domain;

use crate::resolve::NameResolver;
use crate::reverse::ReverseResolver;

/// One naming system
#[async_trait]
pub trait DomainStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether `address` is a domain this strategy handles
    fn is_domain(&self, address: &str) -> bool;

    /// Site address for `domain`
    async fn resolve_domain(&self, domain: &str) -> Option<String>;

    /// Domain for a site address
    async fn reverse_lookup(&self, address: &str) -> Option<String>;
}

/// Ordered list of strategies
#[derive(Clone, Default)]
pub struct ResolverChain {
    strategies: Vec<Arc<dyn DomainStrategy>>,
}

impl ResolverChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy; earlier strategies take precedence
    pub fn with_strategy(mut self, strategy: Arc<dyn DomainStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the registered strategies, in order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether any strategy handles `address`
    pub fn is_domain(&self, address: &str) -> bool {
        self.strategies.iter().any(|s| s.is_domain(address))
    }

    /// First answer among the strategies handling `domain`
    pub async fn resolve_domain(&self, domain: &str) -> Option<String> {
        for strategy in &self.strategies {
            if !strategy.is_domain(domain) {
                continue;
            }
            if let Some(address) = strategy.resolve_domain(domain).await {
                return Some(address);
            }
        }
        None
    }

    /// First domain any strategy reports for `address`
    pub async fn reverse_lookup(&self, address: &str) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(domain) = strategy.reverse_lookup(address).await {
                return Some(domain);
            }
        }
        None
    }
}

/// xID chain names
#[derive(Debug, Clone)]
pub struct XidStrategy {
    names: Arc<NameResolver>,
    reverse: Arc<ReverseResolver>,
    tld: String,
}

impl XidStrategy {
    /// Serve names under `tld`
    pub fn new(names: Arc<NameResolver>, reverse: Arc<ReverseResolver>, tld: &str) -> Self {
        Self {
            names,
            reverse,
            tld: tld.to_string(),
        }
    }
}

#[async_trait]
impl DomainStrategy for XidStrategy {
    fn name(&self) -> &str {
        "xid"
    }

    fn is_domain(&self, address: &str) -> bool {
        is_managed_domain(address, &self.tld)
    }

    async fn resolve_domain(&self, domain: &str) -> Option<String> {
        self.names.resolve(domain).await
    }

    async fn reverse_lookup(&self, address: &str) -> Option<String> {
        self.reverse.reverse_lookup(address).await
    }
}
