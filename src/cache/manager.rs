//! Match cache backed by one JSON file per match identifier
//!
//! Documents are stored as raw JSON text with no envelope, no timestamps
//! and no checksum. Writes are plain full-file overwrites without a
//! temp-file-and-rename step; a reader racing a writer can observe a
//! partial file, which `load` reports as a decode error.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by cache reads and writes
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("failed to read cache file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The cache file is not valid JSON (e.g. a truncated write)
    #[error("cache file {} is not valid json: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document could not be serialized
    #[error("failed to serialize document for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The cache file could not be written
    #[error("failed to write cache file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// File-backed cache mapping match identifiers to their JSON documents
#[derive(Debug, Clone)]
pub struct MatchCache {
    /// Directory where match files are stored
    dir: PathBuf,
}

impl MatchCache {
    /// Opens a cache rooted at `dir`, creating the directory if absent.
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Wraps an existing directory without touching the filesystem.
    ///
    /// Useful for testing or when the directory is known to exist.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Root directory of the cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the cache file for a match identifier.
    pub fn entry_path(&self, match_id: u64) -> PathBuf {
        self.dir.join(format!("{match_id}.json"))
    }

    /// Loads a cached document, if one exists.
    ///
    /// Returns `Ok(None)` when no file exists for the identifier. An
    /// unreadable or corrupt file is an error rather than a miss; callers
    /// decide whether to degrade.
    pub fn load<T: DeserializeOwned>(&self, match_id: u64) -> Result<Option<T>, CacheError> {
        let path = self.entry_path(match_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        let doc =
            serde_json::from_str(&text).map_err(|source| CacheError::Decode { path, source })?;
        Ok(Some(doc))
    }

    /// Stores a document, overwriting any existing file for the identifier.
    pub fn store<T: Serialize>(&self, match_id: u64, doc: &T) -> Result<(), CacheError> {
        let path = self.entry_path(match_id);
        let text = serde_json::to_string(doc).map_err(|source| CacheError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| CacheError::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_cache() -> (MatchCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = MatchCache::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_load_returns_none_for_missing_match() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<Value> = cache.load(4193908).expect("missing file is not an error");

        assert!(result.is_none());
    }

    #[test]
    fn test_store_creates_file_named_by_match_id() {
        let (cache, temp_dir) = create_test_cache();
        let doc = json!({"header": {"status": {"started": true, "finished": true}}});

        cache.store(4193908, &doc).expect("Write should succeed");

        let expected_path = temp_dir.path().join("4193908.json");
        assert!(expected_path.exists(), "Cache file should exist");
    }

    #[test]
    fn test_document_survives_roundtrip() {
        let (cache, _temp_dir) = create_test_cache();
        let doc = json!({
            "general": {"matchId": "42"},
            "header": {"status": {"started": true, "finished": true}},
        });

        cache.store(42, &doc).expect("Write should succeed");
        let result: Value = cache
            .load(42)
            .expect("Read should succeed")
            .expect("Entry should exist");

        assert_eq!(result, doc);
    }

    #[test]
    fn test_store_overwrites_existing_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let first = json!({"score": "0-0"});
        let second = json!({"score": "2-1"});

        cache.store(42, &first).expect("First write should succeed");
        cache.store(42, &second).expect("Second write should succeed");

        let result: Value = cache.load(42).expect("Read should succeed").unwrap();
        assert_eq!(result, second, "Cache should contain latest document");
    }

    #[test]
    fn test_corrupt_entry_is_a_decode_error() {
        let (cache, temp_dir) = create_test_cache();
        std::fs::write(temp_dir.path().join("42.json"), "{\"truncated\": ").unwrap();

        let result: Result<Option<Value>, _> = cache.load(42);

        assert!(matches!(result, Err(CacheError::Decode { .. })));
    }

    #[test]
    fn test_open_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("mobfot");

        let cache = MatchCache::open(nested_path.clone()).expect("Open should succeed");
        cache.store(1, &json!({})).expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("1.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_stored_file_is_raw_json_text() {
        let (cache, temp_dir) = create_test_cache();
        let doc = json!({"header": {"teams": ["Arsenal", "Spurs"]}});

        cache.store(7, &doc).expect("Write should succeed");

        let content = std::fs::read_to_string(temp_dir.path().join("7.json")).unwrap();
        assert_eq!(content, doc.to_string(), "No envelope around the document");
    }
}
