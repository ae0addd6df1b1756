//! Character textures: skin upload and cloak removal.
//!
//! Uploads are only inspected far enough to read the PNG header; everything
//! past dimension validation is stored byte-for-byte. The stored asset is
//! addressed by username and its SHA-256 is recorded on the user so game
//! launchers can cache-bust.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::error::{Error, Notification};
use super::ports::asset_storage::{AssetKind, AssetStorage, AssetStorageError};
use super::ports::user_repository::{UserPersistenceError, UserRepository};
use super::user::{User, UserId};

/// Leading bytes of every PNG file.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Pixel dimensions read from a PNG header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngDimensions {
    pub width: u32,
    pub height: u32,
}

/// Read width and height from the IHDR chunk.
///
/// The IHDR chunk is required to come first, so the dimensions sit at a
/// fixed offset; no full decode is needed.
pub fn png_dimensions(bytes: &[u8]) -> Option<PngDimensions> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some(PngDimensions { width, height })
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateUsername { username: message }
        | UserPersistenceError::DuplicateEmail { email: message } => Error::internal(message),
    }
}

fn map_storage_error(error: AssetStorageError) -> Error {
    let AssetStorageError::Io { message } = error;
    Error::internal(message)
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found("user_not_found", format!("user {id} does not exist"))
}

/// Manages stored skins and cloaks for user accounts.
#[derive(Clone)]
pub struct CharacterService {
    users: Arc<dyn UserRepository>,
    storage: Arc<dyn AssetStorage>,
}

impl CharacterService {
    pub fn new(users: Arc<dyn UserRepository>, storage: Arc<dyn AssetStorage>) -> Self {
        Self { users, storage }
    }

    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))
    }

    /// Store a skin for the user, replacing any existing one.
    ///
    /// The upload must be a PNG with a 2:1 aspect ratio; the recorded hash is
    /// the hex SHA-256 of the raw bytes.
    pub async fn upload_skin(&self, user_id: &UserId, bytes: &[u8]) -> Result<(), Error> {
        let user = self.require_user(user_id).await?;

        let Some(dimensions) = png_dimensions(bytes) else {
            return Err(Error::invalid_request(
                "invalid_image",
                "upload is not a PNG image",
            )
            .with_notification(Notification::error("The uploaded file is not a PNG image.")));
        };
        // checked_mul: the header fields are untrusted, a doubled height can
        // exceed u32::MAX.
        if dimensions.width == 0 || Some(dimensions.width) != dimensions.height.checked_mul(2) {
            return Err(Error::invalid_request(
                "invalid_ratio",
                format!(
                    "skin must have a 2:1 aspect ratio, got {}x{}",
                    dimensions.width, dimensions.height
                ),
            )
            .with_notification(Notification::error(
                "The skin image must be twice as wide as it is tall.",
            )));
        }

        let hash = hex::encode(Sha256::digest(bytes));
        self.storage
            .store(AssetKind::Skin, &user.username, bytes)
            .await
            .map_err(map_storage_error)?;
        self.users
            .set_skin_hash(user_id, Some(&hash))
            .await
            .map_err(map_user_error)
    }

    /// Remove the user's cloak; `false` when none was set.
    pub async fn delete_cloak(&self, user_id: &UserId) -> Result<bool, Error> {
        let user = self.require_user(user_id).await?;
        if user.cloak_hash.is_none() {
            return Ok(false);
        }

        self.storage
            .remove(AssetKind::Cloak, &user.username)
            .await
            .map_err(map_storage_error)?;
        self.users
            .set_cloak_hash(user_id, None)
            .await
            .map_err(map_user_error)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::user::{Email, Username};
    use crate::outbound::memory::{InMemoryAssetStorage, InMemoryUserRepository};

    /// Minimal PNG header carrying the given dimensions.
    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&PNG_SIGNATURE);
        bytes.extend_from_slice(&13_u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    async fn service_with_user() -> (CharacterService, Arc<InMemoryUserRepository>, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = User::register(
            Username::new("D3lph1").expect("valid username"),
            Email::new("d3lph1.contact@gmail.com").expect("valid email"),
            "pbkdf2_sha256$1$salt$hash".to_owned(),
        );
        users.insert(&user).await.expect("insert");
        let service = CharacterService::new(users.clone(), Arc::new(InMemoryAssetStorage::new()));
        (service, users, user)
    }

    #[rstest]
    #[case(64, 32, Some(PngDimensions { width: 64, height: 32 }))]
    #[case(1024, 512, Some(PngDimensions { width: 1024, height: 512 }))]
    fn dimensions_read_from_header(#[case] w: u32, #[case] h: u32, #[case] expected: Option<PngDimensions>) {
        assert_eq!(png_dimensions(&png(w, h)), expected);
    }

    #[rstest]
    #[case(b"not a png at all, just some text bytes".to_vec())]
    #[case(Vec::new())]
    #[case(PNG_SIGNATURE.to_vec())]
    fn garbage_has_no_dimensions(#[case] bytes: Vec<u8>) {
        assert_eq!(png_dimensions(&bytes), None);
    }

    #[tokio::test]
    async fn valid_skin_upload_records_the_hash() {
        let (service, users, user) = service_with_user().await;
        let bytes = png(64, 32);

        service
            .upload_skin(&user.id, &bytes)
            .await
            .expect("upload succeeds");

        let stored = users
            .find_by_id(&user.id)
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(
            stored.skin_hash.as_deref(),
            Some(hex::encode(Sha256::digest(&bytes)).as_str())
        );
    }

    #[rstest]
    #[case(64, 64)]
    #[case(32, 64)]
    #[case(0, 0)]
    #[case(0, 1 << 31)]
    #[case(u32::MAX, u32::MAX / 2 + 1)]
    #[tokio::test]
    async fn wrong_ratio_is_rejected(#[case] w: u32, #[case] h: u32) {
        let (service, _, user) = service_with_user().await;
        let err = service
            .upload_skin(&user.id, &png(w, h))
            .await
            .expect_err("wrong ratio must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.status(), "invalid_ratio");
    }

    #[tokio::test]
    async fn non_png_upload_is_rejected() {
        let (service, _, user) = service_with_user().await;
        let err = service
            .upload_skin(&user.id, b"GIF89a")
            .await
            .expect_err("non-png must fail");
        assert_eq!(err.status(), "invalid_image");
    }

    #[tokio::test]
    async fn upload_for_unknown_user_is_not_found() {
        let (service, _, _) = service_with_user().await;
        let err = service
            .upload_skin(&UserId::random(), &png(64, 32))
            .await
            .expect_err("unknown user must fail");
        assert_eq!(err.status(), "user_not_found");
    }

    #[tokio::test]
    async fn cloak_deletion_reports_whether_one_existed() {
        let (service, users, user) = service_with_user().await;
        assert!(!service
            .delete_cloak(&user.id)
            .await
            .expect("deletion runs"));

        users
            .set_cloak_hash(&user.id, Some("abc123"))
            .await
            .expect("set hash");
        assert!(service.delete_cloak(&user.id).await.expect("deletion runs"));

        let stored = users
            .find_by_id(&user.id)
            .await
            .expect("lookup")
            .expect("user exists");
        assert!(stored.cloak_hash.is_none());
    }
}
