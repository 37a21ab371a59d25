//! Wire models for the xID REST endpoints
//!
//! Cosmos REST gateways encode 64-bit integers as strings and emit `null` for
//! absent values, so the numeric and string fields here are decoded leniently.
//! A value of the wrong shape decodes to its zero value instead of failing the
//! whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an unsigned integer given as a number or a decimal string
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Decode a string, mapping `null` to the empty string
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Decode a flag given as a boolean or as `"true"`; anything else is false
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Response of `/cosmos/base/tendermint/v1beta1/node_info`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfoResponse {
    /// Node description
    #[serde(default)]
    pub default_node_info: Option<DefaultNodeInfo>,
}

/// Node description advertised by the endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultNodeInfo {
    /// Chain id, e.g. `epix_1916-1`
    #[serde(default, deserialize_with = "lenient_string")]
    pub network: String,
}

impl NodeInfoResponse {
    /// Advertised network identifier, if any
    pub fn network(&self) -> Option<&str> {
        self.default_node_info
            .as_ref()
            .map(|info| info.network.as_str())
            .filter(|network| !network.is_empty())
    }
}

/// Response of `/xid/v1/state_digest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateDigestResponse {
    /// Current state digest
    #[serde(default, deserialize_with = "lenient_string")]
    pub digest: String,

    /// Height the digest was computed at
    #[serde(default, deserialize_with = "lenient_u64")]
    pub height: u64,

    /// Number of registered names
    #[serde(default, deserialize_with = "lenient_u64")]
    pub num_names: u64,
}

/// Response of `/xid/v1/attestations?digest=<d>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttestationResponse {
    /// Whether two thirds of validators attested the digest
    #[serde(default, deserialize_with = "lenient_bool")]
    pub finalized: bool,
}

/// Response of `/xid/v1/resolve/<tld>/<name>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveResponse {
    /// Name record, absent or null when the name is not registered
    #[serde(default)]
    pub record: Option<Value>,
}

impl ResolveResponse {
    /// The record if it carries any content
    pub fn existing_record(&self) -> Option<&Value> {
        self.record.as_ref().filter(|record| match record {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Number(_) => true,
        })
    }
}

/// One DNS-style record attached to a name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DnsRecord {
    /// Numeric record type
    #[serde(default, deserialize_with = "lenient_u64")]
    pub record_type: u64,

    /// Record payload
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

/// Response of `/xid/v1/dns/<tld>/<name>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DnsResponse {
    /// Records attached to the name
    #[serde(default)]
    pub records: Option<Vec<DnsRecord>>,
}

impl DnsResponse {
    /// Site address carried by the first record of `record_type`
    pub fn site_address(&self, record_type: u64) -> Option<String> {
        self.records
            .as_deref()
            .and_then(|records| site_address(records, record_type))
    }
}

/// Name part of a snapshot entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotName {
    /// Name label
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Top-level domain
    #[serde(default, deserialize_with = "lenient_string")]
    pub tld: String,
}

/// One domain in a state snapshot page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainSnapshot {
    /// Name record
    #[serde(default)]
    pub record: Option<SnapshotName>,

    /// DNS records attached to the name
    #[serde(default)]
    pub dns_records: Option<Vec<DnsRecord>>,
}

impl DomainSnapshot {
    /// Domain key, `name.tld`, when both parts are present
    pub fn domain_key(&self) -> Option<String> {
        let record = self.record.as_ref()?;
        if record.name.is_empty() || record.tld.is_empty() {
            return None;
        }
        Some(format!("{}.{}", record.name, record.tld).to_lowercase())
    }

    /// Site address carried by the first record of `record_type`
    pub fn site_address(&self, record_type: u64) -> Option<String> {
        self.dns_records
            .as_deref()
            .and_then(|records| site_address(records, record_type))
    }
}

/// Pagination cursor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    /// Key of the next page, absent on the last page
    #[serde(default)]
    pub next_key: Option<String>,
}

/// Response of `/xid/v1/state_snapshot`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPage {
    /// Digest every page of this snapshot is anchored to
    #[serde(default, deserialize_with = "lenient_string")]
    pub digest: String,

    /// Domains on this page
    #[serde(default)]
    pub domains: Option<Vec<DomainSnapshot>>,

    /// Cursor for the next page
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl SnapshotPage {
    /// Domains on this page
    pub fn domains(&self) -> &[DomainSnapshot] {
        self.domains.as_deref().unwrap_or(&[])
    }

    /// Cursor of the next page, if there is one
    pub fn next_key(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    /// Domain to site address pairs found on this page
    pub fn mappings(&self, record_type: u64) -> impl Iterator<Item = (String, String)> + '_ {
        self.domains().iter().filter_map(move |entry| {
            let key = entry.domain_key()?;
            let address = entry.site_address(record_type)?;
            Some((key, address))
        })
    }
}

/// Value of the first record of `record_type`, trimmed; empty counts as absent
pub fn site_address(records: &[DnsRecord], record_type: u64) -> Option<String> {
    let record = records.iter().find(|r| r.record_type == record_type)?;
    let value = record.value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
