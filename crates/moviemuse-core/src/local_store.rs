use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed slot holding the locally persisted watchlist: a single JSON
/// array of movie identifiers.
///
/// Reads fail soft: an absent file, an unreadable file, or corrupt content
/// all come back as an empty list, never an error. The slot is shared by
/// every instance pointed at the same path; last writer wins.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Vec<u64> {
        if !self.path.exists() {
            debug!("Watchlist slot {:?} does not exist, reading as empty", self.path);
            return Vec::new();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<u64>>(&content) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(
                        "Corrupt watchlist slot at {:?}: {}. Treating as empty.",
                        self.path, e
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Failed to read watchlist slot at {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Replace the slot contents with the given sequence
    pub fn write(&self, ids: &[u64]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(ids)?;
        std::fs::write(&self.path, json)?;
        debug!(count = ids.len(), "Watchlist slot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_absent_slot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("watchlist.json"));
        assert_eq!(store.read(), Vec::<u64>::new());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("watchlist.json"));
        store.write(&[603, 604, 605]).unwrap();
        assert_eq!(store.read(), vec![603, 604, 605]);
    }

    #[test]
    fn test_write_replaces_prior_value() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("watchlist.json"));
        store.write(&[1, 2, 3]).unwrap();
        store.write(&[9]).unwrap();
        assert_eq!(store.read(), vec![9]);
    }

    #[test]
    fn test_corrupt_content_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = LocalStore::new(path);
        assert_eq!(store.read(), Vec::<u64>::new());
    }

    #[test]
    fn test_wrong_shape_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, r#"{"ids": [1, 2]}"#).unwrap();
        let store = LocalStore::new(path);
        assert_eq!(store.read(), Vec::<u64>::new());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("data").join("watchlist.json"));
        store.write(&[42]).unwrap();
        assert_eq!(store.read(), vec![42]);
    }
}
