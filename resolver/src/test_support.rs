//! In-memory chain used by the resolver tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use xid_attest_client::JsonFetcher;
use xid_attest_core::{Clock, ManualClock, ResolverConfig};

use crate::context::ChainContext;
use crate::service::XidResolver;
use crate::site::StaticSiteDirectory;

pub const BASE: &str = "http://chain.test";
pub const NODE_INFO: &str = "/cosmos/base/tendermint/v1beta1/node_info";
pub const STATE_DIGEST: &str = "/xid/v1/state_digest";
pub const SNAPSHOT: &str = "/xid/v1/state_snapshot";

pub fn attestation_path(digest: &str) -> String {
    format!("/xid/v1/attestations?digest={}", digest)
}

pub fn snapshot_path(key: &str) -> String {
    format!("{}?pagination.key={}", SNAPSHOT, key)
}

pub fn resolve_path(tld: &str, name: &str) -> String {
    format!("/xid/v1/resolve/{}/{}", tld, name)
}

pub fn dns_path(tld: &str, name: &str) -> String {
    format!("/xid/v1/dns/{}/{}", tld, name)
}

/// Scripted responses keyed by path and query
///
/// A route answers with its queued responses in order and keeps repeating the
/// last one. A `None` response simulates an unreachable endpoint.
#[derive(Debug, Default)]
pub struct ScriptedChain {
    routes: Mutex<HashMap<String, VecDeque<Option<Value>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, value: Value) {
        self.respond_seq(path, vec![Some(value)]);
    }

    pub fn respond_seq(&self, path: &str, values: Vec<Option<Value>>) {
        self.routes.lock().unwrap().insert(path.to_string(), values.into());
    }

    pub fn fail(&self, path: &str) {
        self.respond_seq(path, vec![None]);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Chain identity, head and finalized digest for `digest`
    pub fn healthy(&self, digest: &str) {
        self.respond(NODE_INFO, node_info_doc("epix_1916-1"));
        self.respond(STATE_DIGEST, digest_doc(digest, 100));
        self.respond(&attestation_path(digest), json!({"finalized": true}));
    }
}

#[async_trait]
impl JsonFetcher for ScriptedChain {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        let path = url.strip_prefix(BASE).unwrap_or(url).to_string();
        self.calls.lock().unwrap().push(path.clone());

        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&path)?;
        if queue.len() > 1 {
            queue.pop_front().flatten()
        } else {
            queue.front().cloned().flatten()
        }
    }
}

pub fn node_info_doc(network: &str) -> Value {
    json!({"default_node_info": {"network": network}})
}

pub fn digest_doc(digest: &str, height: u64) -> Value {
    json!({"digest": digest, "height": height.to_string(), "num_names": "2"})
}

pub fn snapshot_doc(digest: &str, entries: &[(&str, &str)], next_key: Option<&str>) -> Value {
    let domains: Vec<Value> = entries
        .iter()
        .map(|(domain, address)| {
            let (name, tld) = domain.split_once('.').unwrap();
            json!({
                "record": {"name": name, "tld": tld},
                "dns_records": [{"record_type": "65280", "value": address}]
            })
        })
        .collect();
    json!({"digest": digest, "domains": domains, "pagination": {"next_key": next_key}})
}

pub fn name_record_doc(name: &str) -> Value {
    json!({"record": {"name": name, "tld": "epix", "owner": "epix1owner"}})
}

pub fn dns_doc(address: &str) -> Value {
    json!({"records": [{"record_type": 65280, "value": address}]})
}

pub struct Harness {
    pub chain: Arc<ScriptedChain>,
    pub clock: Arc<ManualClock>,
    pub sites: Arc<StaticSiteDirectory>,
    pub resolver: XidResolver,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::for_testing())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let chain = ScriptedChain::new();
        let clock = Arc::new(ManualClock::new());
        let sites = Arc::new(StaticSiteDirectory::new());
        let resolver = XidResolver::with_parts(
            config.with_rpc_url(BASE),
            chain.clone(),
            clock.clone() as Arc<dyn Clock>,
            sites.clone(),
        );
        Self { chain, clock, sites, resolver }
    }

    pub fn context(&self) -> &ChainContext {
        self.resolver.context()
    }
}

/// Context without the facade, for component tests
pub fn context() -> (ChainContext, Arc<ScriptedChain>, Arc<ManualClock>) {
    let chain = ScriptedChain::new();
    let clock = Arc::new(ManualClock::new());
    let ctx = ChainContext::new(
        ResolverConfig::for_testing().with_rpc_url(BASE),
        chain.clone(),
        clock.clone() as Arc<dyn Clock>,
    );
    (ctx, chain, clock)
}
