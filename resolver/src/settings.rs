//! Service settings
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file, then `XID_*` environment variables (for example `XID_RPC_URL` or
//! `XID_SNAPSHOT_TTL_SECS`). Command line flags are applied on top by the
//! binary.

use std::net::SocketAddr;

use config::{Config, Environment, File};
use xid_attest_core::ResolverConfig;

use crate::error::Result;

/// Default address the admin service listens on
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7070";

/// Prefix of environment variables read as settings
pub const ENV_PREFIX: &str = "XID";

/// Settings of the resolver service
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Address the admin service listens on
    pub listen_addr: SocketAddr,

    /// Resolver configuration
    pub resolver: ResolverConfig,
}

impl ServiceSettings {
    /// Load settings from `config_path` (if given) and the environment
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with(config_path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(config_path: Option<&str>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder().set_default("listen_addr", DEFAULT_LISTEN_ADDR)?;
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        let settings = builder.add_source(environment).build()?;

        let listen_addr = settings.get_string("listen_addr")?.parse()?;
        let resolver: ResolverConfig = settings.try_deserialize()?;
        resolver.validate()?;

        Ok(Self { listen_addr, resolver })
    }
}
