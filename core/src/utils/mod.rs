//! Utility functions and helpers
//!
//! Small helpers shared by the client and resolver crates.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

/// Number of digest characters shown in log lines and error messages
pub const DIGEST_DISPLAY_LEN: usize = 16;

/// Shorten a digest for display
///
/// Digests are opaque strings, so the cut is made on a character boundary.
pub fn short_digest(digest: &str) -> &str {
    match digest.char_indices().nth(DIGEST_DISPLAY_LEN) {
        Some((idx, _)) => &digest[..idx],
        None => digest,
    }
}

/// Normalize an RPC base URL so endpoint paths can be appended directly
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
