//! Storage trait definitions

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Longest key accepted by any backend
const MAX_KEY_LEN: usize = 64;

/// BLAKE3 hash of blob contents, hex encoded
pub fn content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Reject keys that are not plain base58
///
/// Keys end up as file names, so anything outside the base58 alphabet
/// (separators, dots, NUL) is refused before a backend sees it.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN || bs58::decode(key).into_vec().is_err() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Blob storage keyed by paste key
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store or replace the blob under `key`
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Retrieve a blob
    ///
    /// Returns `StorageError::NotFound` if nothing is stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a blob
    ///
    /// Returns `Ok(())` even if the blob didn't exist (idempotent).
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("3yZe7d").is_ok());

        for bad in ["", "../x", "a/b", "a.b", "0OIl", &"z".repeat(65)] {
            assert!(
                matches!(validate_key(bad), Err(StorageError::InvalidKey(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"").len(), 64);
    }
}
