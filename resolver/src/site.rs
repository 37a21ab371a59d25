//! Access to locally known sites
//!
//! The resolver never reads site storage itself. It asks a [`SiteDirectory`]
//! for a site's root `content.json`, which carries the domain the site claims
//! and its chain attestation settings.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

/// Lookup of locally known sites by address
pub trait SiteDirectory: Send + Sync {
    /// Root `content.json` of the site at `address`
    fn root_content(&self, address: &str) -> Option<Value>;

    /// Domain the site at `address` claims, unverified
    fn claimed_domain(&self, address: &str) -> Option<String> {
        let content = self.root_content(address)?;
        let domain = content.get("domain")?.as_str()?.trim();
        if domain.is_empty() {
            None
        } else {
            Some(domain.to_string())
        }
    }
}

/// In-memory [`SiteDirectory`]
#[derive(Debug, Default)]
pub struct StaticSiteDirectory {
    sites: RwLock<HashMap<String, Value>>,
}

impl StaticSiteDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the root content of a site
    pub fn insert(&self, address: &str, root_content: Value) {
        self.sites
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), root_content);
    }
}

impl SiteDirectory for StaticSiteDirectory {
    fn root_content(&self, address: &str) -> Option<Value> {
        self.sites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }
}
