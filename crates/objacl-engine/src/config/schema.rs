use std::path::PathBuf;

use serde::Deserialize;
use objacl_core::error::{AclError, Result};
use objacl_core::ACL_POLICY_METADATA_KEY;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclConfig {
    pub version: u32,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub acl: AclSection,
}

impl AclConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AclError::UnsupportedVersion);
        }
        self.storage.validate()?;
        self.acl.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local bucket; contents vanish on exit.
    #[default]
    Memory,
    /// Directory-backed bucket under `storage.root`.
    Fs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Required for the `fs` backend.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_private_object_dir")]
    pub private_object_dir: String,

    #[serde(default = "default_public_object_search_paths")]
    pub public_object_search_paths: Vec<String>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: None,
            bucket: default_bucket(),
            private_object_dir: default_private_object_dir(),
            public_object_search_paths: default_public_object_search_paths(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(AclError::BadRequest("storage.bucket must not be empty".into()));
        }
        if self.backend == StorageBackend::Fs && self.root.is_none() {
            return Err(AclError::BadRequest(
                "storage.root is required when storage.backend is fs".into(),
            ));
        }
        Ok(())
    }
}

fn default_bucket() -> String {
    "objacl".into()
}
fn default_private_object_dir() -> String {
    "private".into()
}
fn default_public_object_search_paths() -> Vec<String> {
    vec!["public".into()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclSection {
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,

    /// Group types this deployment expects the application to register.
    #[serde(default)]
    pub group_types: Vec<String>,
}

impl Default for AclSection {
    fn default() -> Self {
        Self {
            metadata_key: default_metadata_key(),
            group_types: Vec::new(),
        }
    }
}

impl AclSection {
    pub fn validate(&self) -> Result<()> {
        if self.metadata_key.trim().is_empty() {
            return Err(AclError::BadRequest("acl.metadata_key must not be empty".into()));
        }
        if self.group_types.iter().any(|t| t.trim().is_empty()) {
            return Err(AclError::BadRequest("acl.group_types entries must not be empty".into()));
        }
        Ok(())
    }
}

fn default_metadata_key() -> String {
    ACL_POLICY_METADATA_KEY.into()
}
