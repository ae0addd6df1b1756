//! Port abstraction for stored character assets.

use async_trait::async_trait;

use crate::domain::user::Username;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by asset storage adapters.
    pub enum AssetStorageError {
        /// The underlying store failed to read or write.
        Io { message: String } => "asset storage failed: {message}",
    }
}

/// Which character asset a request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Skin,
    Cloak,
}

impl AssetKind {
    /// Directory name the asset family is stored under.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Skin => "skins",
            Self::Cloak => "cloaks",
        }
    }
}

/// Driven port for persisting character textures.
///
/// Assets are keyed by username; storing overwrites any previous asset of
/// the same kind.
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Persist the asset bytes, replacing any existing asset.
    async fn store(
        &self,
        kind: AssetKind,
        username: &Username,
        bytes: &[u8],
    ) -> Result<(), AssetStorageError>;

    /// Remove the asset; `false` when nothing was stored.
    async fn remove(&self, kind: AssetKind, username: &Username)
    -> Result<bool, AssetStorageError>;
}
