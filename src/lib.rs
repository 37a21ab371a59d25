/// xID Attest - chain-attested name resolution for EpixNet sites
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `xid-attest-core`: data model, configuration and error types
/// - `xid-attest-client`: JSON fetcher and typed access to the chain REST API
/// - `xid-attest-resolver`: attested resolution, caches, content verification and the admin service

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
