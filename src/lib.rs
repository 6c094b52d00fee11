//! Rust client for the FotMob sports data API
//!
//! Builds request URLs for a fixed set of endpoints (matches by date,
//! leagues, teams, players, match details, TV listings, search), issues
//! GET requests through a transport with standard HTTP response caching,
//! and returns opaque JSON documents. Finished matches are additionally
//! persisted to a write-once file cache under the platform data
//! directory.
//!
//! ```no_run
//! use mobfot::MobFot;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MobFot::new()?;
//! let matches = client.get_matches_by_date("2023-09-10", None).await?;
//! println!("{matches}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod paths;

pub use cache::{CacheError, MatchCache};
pub use client::{ClientError, MobFot, MobFotBuilder};
pub use paths::ConfigError;
