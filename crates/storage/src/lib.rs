//! Storage abstractions for the PM2.5 map service.
//!
//! Provides a single [`ObjectStorage`] client over GCS, S3, a local
//! directory or memory, plus [`StoragePath`] for the bucket layout.

pub mod object_store;

pub use self::object_store::{public_url, ObjectStorage, ObjectStorageConfig, StorageBackend, StoragePath};
