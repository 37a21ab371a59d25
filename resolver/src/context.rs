//! Shared handles passed to every resolver component

use std::sync::Arc;
use std::time::{Duration, Instant};

use xid_attest_client::{ChainApi, JsonFetcher};
use xid_attest_core::{Clock, ResolverConfig};

use crate::cache::CacheState;

/// Endpoint, cache, clock and configuration shared by the components
#[derive(Debug, Clone)]
pub struct ChainContext {
    /// Chain REST API
    pub api: ChainApi,

    /// Shared cache state
    pub cache: Arc<CacheState>,

    /// Time source for cache freshness
    pub clock: Arc<dyn Clock>,

    /// Resolver configuration
    pub config: Arc<ResolverConfig>,
}

impl ChainContext {
    /// Build a context with empty caches
    pub fn new(config: ResolverConfig, fetcher: Arc<dyn JsonFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api: ChainApi::new(&config.rpc_url, fetcher),
            cache: Arc::new(CacheState::new()),
            clock,
            config: Arc::new(config),
        }
    }

    /// Current instant
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Time elapsed since `earlier`
    pub fn age(&self, earlier: Instant) -> Duration {
        self.clock.since(earlier)
    }
}
