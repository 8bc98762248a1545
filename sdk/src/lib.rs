//! Walrus SDK is a client library for the Walrus decentralized blob storage.
//! It uploads blobs through publishers, reads them back through aggregators,
//! and keeps recently downloaded blobs in a local on-disk cache.

/// Project version number for the Walrus SDK.
pub const VERSION_NUMBER: f64 = 1.0;

/// Project version string for the Walrus SDK.
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Error types returned by every fallible operation in this crate. Contains
/// the logic for turning failed HTTP exchanges into structured API errors.
mod error;
pub use error::*;

/// Disk-backed least-recently-used cache of downloaded blobs.
mod cache;
pub use cache::*;

/// Response and metadata models of the publisher and aggregator APIs.
pub mod models;
pub use models::*;

/// TOML configuration of the client: endpoints, timeout and cache settings.
mod config;
pub use config::*;

/// HTTP client talking to Walrus publishers and aggregators.
#[cfg(feature = "client")]
mod client;
#[cfg(feature = "client")]
pub use client::*;
