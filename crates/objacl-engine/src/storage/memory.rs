use async_trait::async_trait;
use dashmap::DashMap;

use objacl_core::error::{AclError, Result};

use super::{ObjectBucket, ObjectMetadata};

#[derive(Debug, Clone, Default)]
struct StoredObject {
    data: Vec<u8>,
    metadata: ObjectMetadata,
}

/// In-process bucket. Each object entry is updated under its shard lock, so a
/// metadata patch never interleaves with another patch of the same object.
pub struct MemoryBucket {
    name: String,
    objects: DashMap<String, StoredObject>,
}

impl MemoryBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: DashMap::new(),
        }
    }

    /// Object bytes, if present.
    pub fn data(&self, object: &str) -> Option<Vec<u8>> {
        self.objects.get(object).map(|o| o.data.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, object: &str) -> Result<bool> {
        Ok(self.objects.contains_key(object))
    }

    async fn metadata(&self, object: &str) -> Result<ObjectMetadata> {
        self.objects
            .get(object)
            .map(|o| o.metadata.clone())
            .ok_or_else(|| AclError::ObjectNotFound(object.to_string()))
    }

    async fn patch_metadata(&self, object: &str, patch: ObjectMetadata) -> Result<()> {
        let mut entry = self
            .objects
            .get_mut(object)
            .ok_or_else(|| AclError::ObjectNotFound(object.to_string()))?;
        entry.metadata.extend(patch);
        Ok(())
    }

    async fn put(&self, object: &str, data: Vec<u8>) -> Result<()> {
        if object.is_empty() {
            return Err(AclError::InvalidPath("object name must not be empty".into()));
        }
        self.objects.insert(
            object.to_string(),
            StoredObject {
                data,
                metadata: ObjectMetadata::new(),
            },
        );
        Ok(())
    }

    async fn delete(&self, object: &str) -> Result<()> {
        self.objects.remove(object);
        Ok(())
    }
}
