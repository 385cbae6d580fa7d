//! services/api/src/adapters/file_store.rs
//!
//! A `KeyValueStore` that keeps one file per key under a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roadmap_core::ports::{KeyValueStore, PortError, PortResult};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys may contain separators; anything outside `[A-Za-z0-9._-]` becomes `_`.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key);
        let io_err = |e: std::io::Error| {
            PortError::Unexpected(format!("failed to write {}: {e}", path.display()))
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;
        // Write to a sibling file and rename so readers never see a partial document.
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, value).await.map_err(io_err)?;
        tokio::fs::rename(&temp, &path).await.map_err(io_err)?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none_and_writes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("alpha").await.unwrap(), None);

        store.set("alpha", "[1]").await.unwrap();
        store.set("alpha", "[2]").await.unwrap();
        assert_eq!(store.get("alpha").await.unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn keys_with_separators_stay_inside_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("../profile/key", "x").await.unwrap();

        let path = store.path_for("../profile/key");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.file_name().unwrap(), ".._profile_key.json");
        assert_eq!(store.get("../profile/key").await.unwrap().as_deref(), Some("x"));
    }
}
