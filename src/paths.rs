//! Platform data-directory resolution
//!
//! Finished-match files live under a per-user data directory:
//! `%APPDATA%\mobfot\` on Windows and `$XDG_DATA_HOME/mobfot/` on POSIX
//! systems. The OS branching is split into pure functions over explicit
//! environment values so it can be tested without touching the real
//! environment; [`default_data_dir`] is the thin wrapper that reads it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Directory name appended to the platform base path.
const APP_DIR: &str = "mobfot";

/// Errors raised while configuring a client
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `XDG_DATA_HOME` is unset or empty on a POSIX system
    #[error("XDG_DATA_HOME environment variable is not set")]
    MissingXdgDataHome,

    /// `APPDATA` is unset or empty on Windows
    #[error("APPDATA environment variable is not set")]
    MissingAppData,

    /// Neither Windows nor POSIX
    #[error("unsupported operating system")]
    UnsupportedPlatform,

    /// The data directory could not be created
    #[error("failed to create data directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// A proxy URL given at construction was rejected by the transport
    #[error("invalid proxy url for scheme {scheme}: {source}")]
    InvalidProxy { scheme: String, source: reqwest::Error },

    /// The HTTP client itself failed to build
    #[error("failed to build http client: {0}")]
    Http(reqwest::Error),
}

/// Computes the data directory from an `%APPDATA%` value.
pub fn windows_data_dir(app_data: Option<&str>) -> Result<PathBuf, ConfigError> {
    match app_data {
        Some(base) if !base.is_empty() => Ok(PathBuf::from(base).join(APP_DIR)),
        _ => Err(ConfigError::MissingAppData),
    }
}

/// Computes the data directory from an `$XDG_DATA_HOME` value.
///
/// The XDG base-directory spec treats an empty value as unset; so does
/// this function.
pub fn posix_data_dir(xdg_data_home: Option<&str>) -> Result<PathBuf, ConfigError> {
    match xdg_data_home {
        Some(base) if !base.is_empty() => Ok(PathBuf::from(base).join(APP_DIR)),
        _ => Err(ConfigError::MissingXdgDataHome),
    }
}

/// Resolves the platform default data directory from the real environment.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(windows)]
    {
        let app_data = std::env::var("APPDATA").ok();
        windows_data_dir(app_data.as_deref())
    }
    #[cfg(unix)]
    {
        let xdg_data_home = std::env::var("XDG_DATA_HOME").ok();
        posix_data_dir(xdg_data_home.as_deref())
    }
    #[cfg(not(any(windows, unix)))]
    {
        Err(ConfigError::UnsupportedPlatform)
    }
}
