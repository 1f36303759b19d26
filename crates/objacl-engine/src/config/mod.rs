//! Engine config loader (strict parsing).

pub mod schema;

use std::fs;

use objacl_core::error::{AclError, Result};

pub use schema::{AclSection, AclConfig, StorageBackend, StorageSection};

pub fn load_from_file(path: &str) -> Result<AclConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AclError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AclConfig> {
    let cfg: AclConfig = serde_yaml::from_str(s)
        .map_err(|e| AclError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
