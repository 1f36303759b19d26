//! Backing object store.
//!
//! The access layer only needs a handful of per-object operations from the
//! store: existence, custom metadata read, and custom metadata patch. Buckets
//! also expose put/delete so tools and tests can manage object lifecycle.
//!
//! - `memory`: `DashMap`-backed bucket (tests, embedding).
//! - `fs`: directory-backed bucket with JSON metadata sidecars.
//! - `paths`: `/objects/<id>` resolution and public search paths.

pub mod fs;
pub mod memory;
pub mod paths;

use std::collections::BTreeMap;

use async_trait::async_trait;

use objacl_core::error::Result;

pub use fs::FsBucket;
pub use memory::MemoryBucket;
pub use paths::ObjectPaths;

/// Custom (user-defined) metadata of one object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// A flat namespace of named objects, each carrying custom metadata.
#[async_trait]
pub trait ObjectBucket: Send + Sync {
    /// Bucket name (used for URL normalization and logs).
    fn name(&self) -> &str;

    async fn exists(&self, object: &str) -> Result<bool>;

    /// Custom metadata of an existing object. Missing object is `ObjectNotFound`.
    async fn metadata(&self, object: &str) -> Result<ObjectMetadata>;

    /// Merge `patch` into the object's metadata: keys present in `patch`
    /// replace prior values, other keys are kept.
    async fn patch_metadata(&self, object: &str, patch: ObjectMetadata) -> Result<()>;

    /// Create or overwrite an object. Overwriting starts a fresh generation
    /// with empty metadata.
    async fn put(&self, object: &str, data: Vec<u8>) -> Result<()>;

    /// Remove an object together with its metadata. Missing object is not an error.
    async fn delete(&self, object: &str) -> Result<()>;
}
