//! FotMob API client
//!
//! [`MobFot`] wraps an HTTP transport with standard `Cache-Control`/`ETag`
//! response caching and exposes one method per remote endpoint. Responses
//! are returned as opaque [`serde_json::Value`] documents; match details
//! additionally go through the write-once file cache in [`crate::cache`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use log::LevelFilter;
use regex::Regex;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cache::MatchCache;
use crate::paths::{self, ConfigError};

/// Base URL of the remote API.
const BASE_URL: &str = "https://www.fotmob.com/api";

/// User agent sent with every request.
const USER_AGENT: &str = concat!("mobfot/", env!("CARGO_PKG_VERSION"));

/// Subdirectory of the data directory holding the HTTP response cache.
const HTTP_CACHE_DIR: &str = "http-cache";

/// Default time zone for schedule-style endpoints.
const DEFAULT_TIME_ZONE: &str = "America/New_York";

/// Default country code for TV listing endpoints.
const DEFAULT_COUNTRY_CODE: &str = "GB";

/// Errors raised by endpoint methods
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a status of 400 or above
    #[error("api returned status {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// The request could not be sent or failed in the middleware stack
    #[error("request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The response body was not valid JSON
    #[error("failed to decode response body: {0}")]
    Decode(#[from] reqwest::Error),
}

/// Builder for [`MobFot`]
///
/// Proxies and the logging level are applied once at construction; the
/// data directory and base URL are injectable so tests can run against a
/// temp directory and a local mock server.
#[derive(Debug, Default)]
pub struct MobFotBuilder {
    proxies: HashMap<String, String>,
    logging_level: Option<String>,
    data_dir: Option<PathBuf>,
    base_url: Option<String>,
}

impl MobFotBuilder {
    /// Routes requests for `scheme` (`http`, `https` or `all`) through the
    /// given proxy URL. Unrecognized schemes are ignored with a warning.
    pub fn proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.proxies.insert(scheme.into(), url.into());
        self
    }

    /// Sets the process log level by name: DEBUG, INFO, WARNING, ERROR or
    /// CRITICAL, case-insensitive. Unrecognized names are ignored with a
    /// warning and leave the current level in effect.
    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.logging_level = Some(level.into());
        self
    }

    /// Overrides the platform data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client, resolving and creating the data directory.
    pub fn build(self) -> Result<MobFot, ConfigError> {
        if let Some(level) = &self.logging_level {
            match parse_level(level) {
                Some(filter) => log::set_max_level(filter),
                None => log::warn!("logging level {level} not recognized"),
            }
        }

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => paths::default_data_dir()?,
        };
        let cache = MatchCache::open(data_dir.clone()).map_err(|source| ConfigError::CreateDir {
            path: data_dir.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        for (scheme, url) in &self.proxies {
            let proxy = match scheme.as_str() {
                "http" => reqwest::Proxy::http(url),
                "https" => reqwest::Proxy::https(url),
                "all" => reqwest::Proxy::all(url),
                other => {
                    log::warn!("proxy scheme {other} not recognized, ignoring");
                    continue;
                }
            }
            .map_err(|source| ConfigError::InvalidProxy {
                scheme: scheme.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(ConfigError::Http)?;

        let http = reqwest_middleware::ClientBuilder::new(client)
            .with(Cache(HttpCache {
                mode: CacheMode::Default,
                manager: CACacheManager {
                    path: data_dir.join(HTTP_CACHE_DIR),
                },
                options: HttpCacheOptions::default(),
            }))
            .build();

        Ok(MobFot {
            http,
            base_url: self.base_url.unwrap_or_else(|| BASE_URL.to_string()),
            cache,
        })
    }
}

/// Client for the FotMob API
///
/// All endpoint methods are async and return the decoded JSON document;
/// the remote schema is not modeled. The client holds no internal
/// concurrency: file I/O blocks the caller and the runtime is supplied
/// by whoever awaits.
#[derive(Clone)]
pub struct MobFot {
    http: ClientWithMiddleware,
    base_url: String,
    cache: MatchCache,
}

impl MobFot {
    /// Starts building a client.
    pub fn builder() -> MobFotBuilder {
        MobFotBuilder::default()
    }

    /// Builds a client with the platform defaults.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// Directory holding cached finished-match files.
    pub fn data_dir(&self) -> &Path {
        self.cache.dir()
    }

    /// Runs a single GET against the API and decodes the JSON body.
    async fn execute_query(
        &self,
        segment: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        let url = format!("{}/{}", self.base_url, segment);
        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        log::debug!("GET {} -> {}", response.url(), status);
        if status.as_u16() >= 400 {
            return Err(ClientError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Gets all the matches for a given date (`YYYY-MM-DD`).
    ///
    /// Dates that fail validation yield an empty object without touching
    /// the network.
    pub async fn get_matches_by_date(
        &self,
        date: &str,
        time_zone: Option<&str>,
    ) -> Result<Value, ClientError> {
        if !date_is_valid(date) {
            log::debug!("rejecting malformed date {date:?}");
            return Ok(Value::Object(Map::new()));
        }
        let params = [
            ("date", date.to_string()),
            ("timezone", time_zone.unwrap_or(DEFAULT_TIME_ZONE).to_string()),
        ];
        self.execute_query("matches", &params).await
    }

    /// Gets information about a given league.
    pub async fn get_league(
        &self,
        id: u64,
        tab: Option<&str>,
        league_type: Option<&str>,
        time_zone: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = [
            ("id", id.to_string()),
            ("tab", tab.unwrap_or("overview").to_string()),
            ("type", league_type.unwrap_or("league").to_string()),
            ("timezone", time_zone.unwrap_or(DEFAULT_TIME_ZONE).to_string()),
        ];
        self.execute_query("leagues", &params).await
    }

    /// Gets information about a given team.
    pub async fn get_team(
        &self,
        id: u64,
        tab: Option<&str>,
        league_type: Option<&str>,
        time_zone: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = [
            ("id", id.to_string()),
            ("tab", tab.unwrap_or("overview").to_string()),
            ("type", league_type.unwrap_or("league").to_string()),
            ("timezone", time_zone.unwrap_or(DEFAULT_TIME_ZONE).to_string()),
        ];
        self.execute_query("teams", &params).await
    }

    /// Gets information about a given player.
    pub async fn get_player(&self, id: u64) -> Result<Value, ClientError> {
        self.execute_query("playerData", &[("id", id.to_string())])
            .await
    }

    /// Gets information about a given match.
    ///
    /// Finished matches are served from and persisted to the file cache;
    /// pass `bypass_cache = true` to force a network fetch regardless of
    /// what is on disk. Cache writes are best effort: a failure is logged
    /// and the freshly fetched document is still returned.
    pub async fn get_match_details(
        &self,
        match_id: u64,
        bypass_cache: bool,
    ) -> Result<Value, ClientError> {
        if !bypass_cache {
            match self.cache.load::<Value>(match_id) {
                Ok(Some(details)) => {
                    log::debug!("serving match {match_id} from file cache");
                    return Ok(details);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("ignoring unreadable cache entry for match {match_id}: {err}")
                }
            }
        }

        let details = self
            .execute_query("matchDetails", &[("matchId", match_id.to_string())])
            .await?;
        if match_is_finished(&details) {
            if let Err(err) = self.cache.store(match_id, &details) {
                log::warn!("failed to cache match {match_id}: {err}");
            }
        }
        Ok(details)
    }

    /// Gets the TV listing for a given match.
    pub async fn get_match_tv_listing(
        &self,
        match_id: u64,
        country_code: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = [
            ("matchId", match_id.to_string()),
            (
                "countryCode",
                country_code.unwrap_or(DEFAULT_COUNTRY_CODE).to_string(),
            ),
        ];
        self.execute_query("tvlisting", &params).await
    }

    /// Gets TV listing information by country.
    pub async fn get_tv_listings_country(
        &self,
        country_code: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = [(
            "countryCode",
            country_code.unwrap_or(DEFAULT_COUNTRY_CODE).to_string(),
        )];
        self.execute_query("tvlistings", &params).await
    }

    /// Searches FotMob for a given term.
    ///
    /// The term is form-encoded into the query string, so spaces travel
    /// as `+`.
    pub async fn search(
        &self,
        term: &str,
        user_language: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = [
            ("term", term.to_string()),
            (
                "userLanguage",
                user_language.unwrap_or("en-GB,en").to_string(),
            ),
        ];
        self.execute_query("searchData", &params).await
    }
}

/// Accepts dates written `YYYY-MM-DD` or `YYYYMMDD` for years 20xx.
///
/// Matching is prefix-anchored only, so trailing text after a valid date
/// is tolerated.
fn date_is_valid(date: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^(20\d{2})-?(\d{2})-?(\d{2})").expect("date pattern is valid"));
    pattern.is_match(date)
}

/// A match is cacheable once the API reports it both started and finished.
fn match_is_finished(details: &Value) -> bool {
    let status = &details["header"]["status"];
    status["finished"].as_bool().unwrap_or(false) && status["started"].as_bool().unwrap_or(false)
}

/// Maps the accepted level names onto `log` filters. CRITICAL collapses
/// into Error; the `log` crate has no critical severity.
fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::Debug),
        "INFO" => Some(LevelFilter::Info),
        "WARNING" | "WARN" => Some(LevelFilter::Warn),
        "ERROR" | "CRITICAL" => Some(LevelFilter::Error),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_hyphenated_date_is_accepted() {
        assert!(date_is_valid("2023-09-10"));
        assert!(date_is_valid("2099-12-31"));
    }

    #[test]
    fn valid_compact_date_is_accepted() {
        assert!(date_is_valid("20230910"));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(!date_is_valid("09-10-2023"));
        assert!(!date_is_valid("1999-09-10"));
        assert!(!date_is_valid("today"));
        assert!(!date_is_valid(""));
        assert!(!date_is_valid("20-23-09"));
    }

    #[test]
    fn trailing_text_after_valid_date_is_tolerated() {
        assert!(date_is_valid("2023-09-10T12:00"));
    }

    #[test]
    fn finished_and_started_match_is_finished() {
        let details = json!({
            "header": {"status": {"started": true, "finished": true}}
        });
        assert!(match_is_finished(&details));
    }

    #[test]
    fn live_match_is_not_finished() {
        let details = json!({
            "header": {"status": {"started": true, "finished": false}}
        });
        assert!(!match_is_finished(&details));
    }

    #[test]
    fn not_started_match_is_not_finished() {
        let details = json!({
            "header": {"status": {"started": false, "finished": true}}
        });
        assert!(!match_is_finished(&details));
    }

    #[test]
    fn missing_status_fields_mean_not_finished() {
        assert!(!match_is_finished(&json!({})));
        assert!(!match_is_finished(&json!({"header": {}})));
        assert!(!match_is_finished(
            &json!({"header": {"status": {"finished": "yes"}}})
        ));
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("Info"), Some(LevelFilter::Info));
        assert_eq!(parse_level("WARNING"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("error"), Some(LevelFilter::Error));
        assert_eq!(parse_level("critical"), Some(LevelFilter::Error));
    }

    #[test]
    fn unrecognized_level_names_yield_none() {
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }
}
