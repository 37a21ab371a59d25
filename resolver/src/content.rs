//! Chain-attested site content
//!
//! A site may declare in its root `content.json` that everything under a data
//! directory is written against chain state:
//!
//! ```json
//! { "chain_attestation": { "data_dir": "data/users/", "rpc_url": "https://..." } }
//! ```
//!
//! Such content files carry a `state_digest`. They are accepted in place of
//! signature checks only when that digest is the current chain head and the
//! head has been finalized. Sites may point at their own endpoint; answers from
//! such an endpoint are never cached.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xid_attest_client::ChainApi;
use xid_attest_core::utils::{normalize_base_url, short_digest};
use xid_attest_core::{Domain, HeadDigest, NameRecordEntry, VerifyError, UNANCHORED_DIGEST};

use crate::attestation::{check_finality, AttestationChecker};
use crate::context::ChainContext;
use crate::head::{fetch_head, HeadDigestTracker};
use crate::site::SiteDirectory;

/// `chain_attestation` section of a root `content.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAttestationConfig {
    /// Path prefix of chain-attested content
    #[serde(default)]
    pub data_dir: String,

    /// Endpoint override for this site
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl ChainAttestationConfig {
    /// Section of `root_content`, if present and well formed
    pub fn from_root_content(root_content: &Value) -> Option<Self> {
        let section = root_content.get("chain_attestation")?;
        serde_json::from_value(section.clone()).ok()
    }

    /// Whether `inner_path` lies under the attested data directory
    pub fn covers(&self, inner_path: &str) -> bool {
        !self.data_dir.is_empty() && inner_path.starts_with(&self.data_dir)
    }

    /// Normalized endpoint override, if one is set
    pub fn rpc_override(&self) -> Option<String> {
        self.rpc_url
            .as_deref()
            .map(normalize_base_url)
            .filter(|url| !url.is_empty())
    }
}

/// Attestation settings applying to `inner_path`, if any
pub fn chain_attestation_for(root_content: &Value, inner_path: &str) -> Option<ChainAttestationConfig> {
    ChainAttestationConfig::from_root_content(root_content).filter(|config| config.covers(inner_path))
}

/// Chain state a content file was verified against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedContent {
    /// Finalized digest the content declared
    pub digest: String,

    /// Chain height of that digest
    pub height: u64,
}

enum Endpoint {
    Shared,
    Override(ChainApi),
}

/// Verifies chain-attested content and reads chain records for such sites
#[derive(Clone)]
pub struct ContentVerifier {
    ctx: ChainContext,
    head: Arc<HeadDigestTracker>,
    attestation: Arc<AttestationChecker>,
    sites: Arc<dyn SiteDirectory>,
}

impl std::fmt::Debug for ContentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentVerifier").field("ctx", &self.ctx).finish()
    }
}

impl ContentVerifier {
    /// Create a content verifier
    pub fn new(
        ctx: ChainContext,
        head: Arc<HeadDigestTracker>,
        attestation: Arc<AttestationChecker>,
        sites: Arc<dyn SiteDirectory>,
    ) -> Self {
        Self { ctx, head, attestation, sites }
    }

    /// Verify `content` stored at `inner_path` of a site with `root_content`
    ///
    /// Returns `Ok(None)` when the file is not chain-attested and must go
    /// through regular signature verification.
    pub async fn verify_content(
        &self,
        root_content: &Value,
        inner_path: &str,
        content: &Value,
    ) -> Result<Option<AttestedContent>, VerifyError> {
        if !inner_path.ends_with("content.json") {
            return Ok(None);
        }
        let config = match chain_attestation_for(root_content, inner_path) {
            Some(config) => config,
            None => return Ok(None),
        };

        let claimed = content
            .get("state_digest")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if claimed.is_empty() {
            return Err(VerifyError::MissingStateDigest);
        }

        let endpoint = self.endpoint(&config);
        let head = self.head_for(&endpoint).await.ok_or(VerifyError::HeadUnavailable)?;

        if claimed != head.digest {
            return Err(VerifyError::DigestMismatch {
                claimed: claimed.to_string(),
                chain: head.digest,
            });
        }

        if !self.is_finalized(&endpoint, &head.digest).await {
            return Err(VerifyError::NotFinalized { digest: head.digest });
        }

        debug!(
            "Chain-attested content {} verified at {}... (height {})",
            inner_path,
            short_digest(&head.digest),
            head.height
        );
        Ok(Some(AttestedContent {
            digest: head.digest,
            height: head.height,
        }))
    }

    /// [`verify_content`](Self::verify_content) for a site known to the directory
    ///
    /// An unknown site has no attestation settings, so its content is not
    /// chain-attested.
    pub async fn verify_site_content(
        &self,
        address: &str,
        inner_path: &str,
        content: &Value,
    ) -> Result<Option<AttestedContent>, VerifyError> {
        match self.sites.root_content(address) {
            Some(root) => self.verify_content(&root, inner_path, content).await,
            None => Ok(None),
        }
    }

    /// Raw chain record of `name.tld` for a chain-attested site
    ///
    /// Returns `None` when the site is not chain-attested, the name is not
    /// registered, or the chain could not be reached. Records from the shared
    /// endpoint are cached until the head digest moves.
    pub async fn resolve_chain_name(&self, root_content: &Value, tld: &str, name: &str) -> Option<Value> {
        let config = ChainAttestationConfig::from_root_content(root_content)?;
        let domain = Domain::parse(&format!("{}.{}", name, tld))?;

        if let Endpoint::Override(api) = self.endpoint(&config) {
            let response = api.resolve_name(domain.tld(), domain.name()).await?;
            return response.existing_record().cloned();
        }

        let digest = self
            .head
            .current()
            .await
            .map(|head| head.digest)
            .unwrap_or_else(|| UNANCHORED_DIGEST.to_string());

        let key = domain.key();
        if let Some(entry) = self.ctx.cache.name_record(&key) {
            return entry.record;
        }

        let response = self.ctx.api.resolve_name(domain.tld(), domain.name()).await?;
        let record = response.existing_record().cloned();
        self.ctx.cache.put_name_record(
            &key,
            NameRecordEntry {
                record: record.clone(),
                digest,
            },
        );
        record
    }

    fn endpoint(&self, config: &ChainAttestationConfig) -> Endpoint {
        match config.rpc_override() {
            Some(url) if url != self.ctx.api.base_url() => Endpoint::Override(self.ctx.api.with_base_url(&url)),
            _ => Endpoint::Shared,
        }
    }

    async fn head_for(&self, endpoint: &Endpoint) -> Option<HeadDigest> {
        match endpoint {
            Endpoint::Shared => self.head.current().await,
            Endpoint::Override(api) => fetch_head(api, self.ctx.clock.as_ref()).await,
        }
    }

    async fn is_finalized(&self, endpoint: &Endpoint, digest: &str) -> bool {
        match endpoint {
            Endpoint::Shared => self.attestation.is_finalized(digest).await,
            Endpoint::Override(api) => check_finality(api, digest).await,
        }
    }
}
