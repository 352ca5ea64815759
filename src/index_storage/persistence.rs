//! Index persistence: load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{INDEX_VERSION, SearchIndex};

/// File name of the persisted index document inside its directory
pub const INDEX_FILENAME: &str = "search-index.json";

/// Location of the index document inside `dir`
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILENAME)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load the index document stored in `dir`.
///
/// Returns `None` if the file is missing or was written by an incompatible index version
/// (caller should rebuild).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not a valid index document.
pub fn load_index(dir: &Path) -> Result<Option<SearchIndex>> {
    let path = index_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;

    // Peek at the version before deserializing the whole document
    let version = serde_json::from_str::<serde_json::Value>(&json)
        .context("Failed to parse index JSON")?
        .get("version")
        .and_then(serde_json::Value::as_u64);
    if version != Some(u64::from(INDEX_VERSION)) {
        warn!(
            expected = INDEX_VERSION,
            found = ?version,
            path = %path.display(),
            "Index version mismatch, rebuilding"
        );
        return Ok(None);
    }

    let index = SearchIndex::from_json(&json)?;
    info!(path = %path.display(), conversations = index.len(), "Loaded search index");
    Ok(Some(index))
}

/// Save an index document into `dir` atomically (temp file + rename), creating `dir` if
/// needed.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized or the file cannot be written.
pub fn save_index(dir: &Path, index: &SearchIndex) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

    let path = index_path(dir);
    let temp = temp_path(&path);
    let json = index.to_json()?;
    fs::write(&temp, json).context("Failed to write index temp file")?;
    fs::rename(&temp, &path).context("Failed to rename index temp file")?;

    info!(path = %path.display(), conversations = index.len(), "Saved search index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::IndexConfig;
    use crate::indexer::build_index;

    fn empty_index() -> SearchIndex {
        build_index(&[], None, &IndexConfig::default()).unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let index = empty_index();

        save_index(dir.path(), &index).unwrap();
        let path = dir.path().join(INDEX_FILENAME);
        assert!(path.is_file());
        assert!(!temp_path(&path).exists(), "Temp file should be renamed away");

        let loaded = load_index(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("cache").join("index");

        save_index(&nested, &empty_index()).unwrap();
        assert!(nested.join(INDEX_FILENAME).is_file());
        assert!(load_index(&nested).unwrap().is_some());
    }

    #[test]
    fn test_save_overwrites_previous_index() {
        let dir = TempDir::new().unwrap();
        let mut first = empty_index();
        first.generated_at = "2024-01-01T00:00:00.000Z".to_string();
        save_index(dir.path(), &first).unwrap();

        let second = empty_index();
        save_index(dir.path(), &second).unwrap();
        assert_eq!(load_index(dir.path()).unwrap().unwrap(), second);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_index(dir.path()).unwrap().is_none());
        assert!(load_index(&dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn test_load_version_mismatch_requests_rebuild() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILENAME), r#"{"version": 999}"#).unwrap();

        assert!(load_index(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupted_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILENAME), "{not json").unwrap();

        assert!(load_index(dir.path()).is_err());
    }

    #[test]
    fn test_temp_path_sibling() {
        assert_eq!(
            temp_path(Path::new("/cache/search-index.json")),
            PathBuf::from("/cache/search-index.json.tmp")
        );
    }
}
