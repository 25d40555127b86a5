//! pastey-storage: Blob storage for paste contents
//!
//! Stores raw paste bytes under the paste key. No authorization logic;
//! callers are expected to have passed the access gate already.
//!
//! ## Backends
//!
//! | Backend            | Use Case                             |
//! |--------------------|--------------------------------------|
//! | `InMemoryStorage`  | Unit tests, ephemeral runs           |
//! | `LocalFileStorage` | Single-node deployments              |
//! | `S3Storage`        | Shared object storage (`s3` feature) |
//!
//! ## Example
//!
//! ```rust,ignore
//! use pastey_storage::{BlobStorage, InMemoryStorage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = InMemoryStorage::new();
//!
//!     storage.put("3yZe7d", b"Hello, pastes!").await?;
//!     let retrieved = storage.get("3yZe7d").await?;
//!     assert_eq!(retrieved, b"Hello, pastes!");
//!
//!     Ok(())
//! }
//! ```

mod error;
mod traits;

mod local;
mod memory;
#[cfg(feature = "s3")]
mod s3;

// Re-exports
pub use error::{StorageError, StorageResult};
pub use traits::{BlobStorage, content_hash, validate_key};

pub use local::LocalFileStorage;
pub use memory::InMemoryStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;
