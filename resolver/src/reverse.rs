//! Reverse lookup with forward confirmation
//!
//! A site may claim any domain in its content. The claim is only accepted when
//! resolving that domain leads back to the same address.

use std::sync::Arc;

use log::debug;
use xid_attest_core::{Domain, ReverseEntry};

use crate::context::ChainContext;
use crate::resolve::NameResolver;
use crate::site::SiteDirectory;

/// Maps site addresses back to verified domains
#[derive(Clone)]
pub struct ReverseResolver {
    ctx: ChainContext,
    names: Arc<NameResolver>,
    sites: Arc<dyn SiteDirectory>,
}

impl std::fmt::Debug for ReverseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseResolver").field("ctx", &self.ctx).finish()
    }
}

impl ReverseResolver {
    /// Create a reverse resolver
    pub fn new(ctx: ChainContext, names: Arc<NameResolver>, sites: Arc<dyn SiteDirectory>) -> Self {
        Self { ctx, names, sites }
    }

    /// Verified domain of the site at `address`
    pub async fn reverse_lookup(&self, address: &str) -> Option<String> {
        if let Some(entry) = self.ctx.cache.reverse_entry(address) {
            return Some(entry.domain);
        }

        let claimed = self.sites.claimed_domain(address)?;
        let domain = Domain::parse(&claimed)?;
        if !domain.is_in(&self.ctx.config.managed_tld) {
            return None;
        }

        let entry = self.names.resolve_domain(&domain).await?;
        if entry.address.as_deref() != Some(address) {
            debug!(
                "Domain claim {} by {} not confirmed by the chain (resolves to {:?})",
                domain, address, entry.address
            );
            return None;
        }

        let key = domain.key();
        self.ctx.cache.put_reverse_entry(ReverseEntry {
            address: address.to_string(),
            domain: key.clone(),
            digest: entry.digest,
        });
        Some(key)
    }
}
