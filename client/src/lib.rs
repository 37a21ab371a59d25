//! Client library for the xID chain REST API
//!
//! This library provides a JSON fetcher that never fails loudly and a typed
//! view of the chain endpoints used for attested name resolution.

pub mod fetcher;
pub mod api;
pub mod wire;

pub use api::ChainApi;
pub use fetcher::{FetchError, HttpFetcher, JsonFetcher};
