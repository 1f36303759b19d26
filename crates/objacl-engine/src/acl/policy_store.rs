use std::sync::Arc;

use objacl_core::error::{AclError, Result};
use objacl_core::policy::{decode_policy, encode_policy, ACL_POLICY_METADATA_KEY};
use objacl_core::AccessPolicy;

use crate::storage::{ObjectBucket, ObjectMetadata};

/// Persists one policy per object under a reserved metadata key.
///
/// `set_policy` replaces the whole document (last writer wins). Callers that
/// need read-modify-write must bring their own concurrency control.
#[derive(Clone)]
pub struct AccessPolicyStore {
    bucket: Arc<dyn ObjectBucket>,
    metadata_key: String,
}

impl AccessPolicyStore {
    pub fn new(bucket: Arc<dyn ObjectBucket>) -> Self {
        Self::with_metadata_key(bucket, ACL_POLICY_METADATA_KEY)
    }

    pub fn with_metadata_key(bucket: Arc<dyn ObjectBucket>, metadata_key: impl Into<String>) -> Self {
        Self {
            bucket,
            metadata_key: metadata_key.into(),
        }
    }

    pub fn metadata_key(&self) -> &str {
        &self.metadata_key
    }

    pub fn bucket(&self) -> &Arc<dyn ObjectBucket> {
        &self.bucket
    }

    /// Attach `policy` to an existing object, replacing any prior policy.
    pub async fn set_policy(&self, object: &str, policy: &AccessPolicy) -> Result<()> {
        if !self.bucket.exists(object).await? {
            return Err(AclError::ObjectNotFound(object.to_string()));
        }

        let value = encode_policy(policy)?;
        let mut patch = ObjectMetadata::new();
        patch.insert(self.metadata_key.clone(), value);
        self.bucket.patch_metadata(object, patch).await?;

        tracing::debug!(
            object = %object,
            owner = %policy.owner,
            visibility = ?policy.visibility,
            rules = policy.acl_rules.len(),
            "acl policy set"
        );
        Ok(())
    }

    /// Policy attached to `object`, or `None` when the key is absent or empty.
    ///
    /// A present but unreadable value is an error, never `None`.
    pub async fn get_policy(&self, object: &str) -> Result<Option<AccessPolicy>> {
        let md = self.bucket.metadata(object).await?;
        match md.get(&self.metadata_key) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => decode_policy(raw).map(Some).map_err(|e| {
                tracing::error!(object = %object, error = %e, "corrupt acl policy");
                e
            }),
        }
    }
}
