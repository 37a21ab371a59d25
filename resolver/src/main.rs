use anyhow::Result;
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use xid_attest_resolver::api;
use xid_attest_resolver::settings::ServiceSettings;
use xid_attest_resolver::{StaticSiteDirectory, XidResolver};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chain-attested xID name resolver")]
struct Args {
    /// Config file path
    #[arg(short, long, env = "XID_CONFIG")]
    config: Option<String>,

    /// Chain REST API base URL
    #[arg(long, env = "XID_RPC_URL")]
    rpc_url: Option<String>,

    /// Expected chain id prefix
    #[arg(long, env = "XID_EXPECTED_CHAIN_PREFIX")]
    chain_prefix: Option<String>,

    /// Address to listen on
    #[arg(short, long, env = "XID_LISTEN_ADDR")]
    listen: Option<SocketAddr>,

    /// Request timeout in seconds
    #[arg(long, env = "XID_REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut settings = ServiceSettings::load(args.config.as_deref())?;

    // Override config with command-line arguments
    if let Some(rpc_url) = args.rpc_url {
        settings.resolver = settings.resolver.with_rpc_url(&rpc_url);
    }
    if let Some(prefix) = args.chain_prefix {
        settings.resolver.expected_chain_prefix = prefix;
    }
    if let Some(listen) = args.listen {
        settings.listen_addr = listen;
    }
    if let Some(timeout) = args.timeout {
        settings.resolver.request_timeout_secs = timeout;
    }
    settings.resolver.validate()?;

    info!("Starting xID resolver against {}", settings.resolver.rpc_url);

    // Sites are registered by the host; the standalone service starts empty
    let sites = Arc::new(StaticSiteDirectory::new());
    let resolver = Arc::new(XidResolver::new(settings.resolver.clone(), sites));
    let app = api::create_router(resolver);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    info!("Listening on {}", settings.listen_addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("xID resolver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
