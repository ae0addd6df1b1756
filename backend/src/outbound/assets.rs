//! Filesystem-backed character asset storage.
//!
//! Assets land under `<root>/<kind>/<username>.png`. Usernames are already
//! constrained to word characters by the domain, so they are safe as file
//! names.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::domain::ports::asset_storage::{AssetKind, AssetStorage, AssetStorageError};
use crate::domain::user::Username;

/// Asset store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsAssetStorage {
    root: PathBuf,
}

impl FsAssetStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, kind: AssetKind, username: &Username) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{}.png", username.as_ref()))
    }
}

fn map_io_error(error: std::io::Error) -> AssetStorageError {
    AssetStorageError::io(error.to_string())
}

#[async_trait]
impl AssetStorage for FsAssetStorage {
    async fn store(
        &self,
        kind: AssetKind,
        username: &Username,
        bytes: &[u8],
    ) -> Result<(), AssetStorageError> {
        let path = self.path_for(kind, username);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(map_io_error)?;
        }
        fs::write(&path, bytes).await.map_err(map_io_error)
    }

    async fn remove(
        &self,
        kind: AssetKind,
        username: &Username,
    ) -> Result<bool, AssetStorageError> {
        let path = self.path_for(kind, username);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(e)),
        }
    }
}
