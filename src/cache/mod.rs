//! Write-once file cache for finished-match documents
//!
//! Finished matches never change, so each one is stored as a single
//! `<match-id>.json` file under the client's data directory and served
//! from disk on later requests. There is no TTL and no invalidation.

mod manager;

pub use manager::{CacheError, MatchCache};
