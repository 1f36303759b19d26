//! Shared application state for the access engine.
//!
//! Wires config, bucket, path resolution, policy store, group registry,
//! evaluator and metrics into one cheaply clonable handle.

use std::sync::Arc;

use objacl_core::error::{AclError, Result};
use objacl_core::{AccessPolicy, Permission};

use crate::acl::{AccessDecision, AccessPolicyStore, GroupRegistry, PermissionEvaluator};
use crate::config::{AclConfig, StorageBackend};
use crate::obs::AclMetrics;
use crate::storage::paths::OBJECTS_PREFIX;
use crate::storage::{FsBucket, MemoryBucket, ObjectBucket, ObjectPaths};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AclConfig,
    bucket: Arc<dyn ObjectBucket>,
    paths: ObjectPaths,
    evaluator: PermissionEvaluator,
    metrics: Arc<AclMetrics>,
}

impl AppState {
    /// Build state from config, opening the configured bucket backend.
    pub fn new(cfg: AclConfig, groups: GroupRegistry) -> Result<Self> {
        let bucket: Arc<dyn ObjectBucket> = match cfg.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryBucket::new(cfg.storage.bucket.clone())),
            StorageBackend::Fs => {
                let root = cfg.storage.root.clone().ok_or_else(|| {
                    AclError::BadRequest("storage.root is required when storage.backend is fs".into())
                })?;
                Arc::new(FsBucket::new(cfg.storage.bucket.clone(), root))
            }
        };
        Self::with_bucket(cfg, bucket, groups)
    }

    /// Build state over a caller-supplied bucket.
    pub fn with_bucket(
        cfg: AclConfig,
        bucket: Arc<dyn ObjectBucket>,
        groups: GroupRegistry,
    ) -> Result<Self> {
        cfg.validate()?;

        // config <-> registry sanity check; the registry decides at evaluation time.
        for ty in &cfg.acl.group_types {
            if !groups.is_registered(ty) {
                tracing::warn!(group_type = %ty, "acl.group_types lists a type with no registered resolver");
            }
        }
        for ty in groups.registered_types() {
            if !cfg.acl.group_types.contains(&ty) {
                tracing::debug!(group_type = %ty, "registered group type not listed in acl.group_types");
            }
        }

        let paths = ObjectPaths::new(
            bucket.name().to_string(),
            &cfg.storage.private_object_dir,
            &cfg.storage.public_object_search_paths,
        );
        let metrics = Arc::new(AclMetrics::new());
        let store = AccessPolicyStore::with_metadata_key(bucket.clone(), cfg.acl.metadata_key.clone());
        let evaluator = PermissionEvaluator::new(store, Arc::new(groups)).with_metrics(metrics.clone());

        tracing::info!(
            bucket = %bucket.name(),
            backend = ?cfg.storage.backend,
            metadata_key = %cfg.acl.metadata_key,
            "objacl state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                bucket,
                paths,
                evaluator,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &AclConfig {
        &self.inner.cfg
    }

    pub fn bucket(&self) -> Arc<dyn ObjectBucket> {
        Arc::clone(&self.inner.bucket)
    }

    pub fn paths(&self) -> &ObjectPaths {
        &self.inner.paths
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.inner.evaluator
    }

    pub fn groups(&self) -> &GroupRegistry {
        self.inner.evaluator.groups()
    }

    pub fn metrics(&self) -> Arc<AclMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Map a client reference to a bucket object name.
    ///
    /// Accepts `/objects/<id>`, a storage URL of a private entity, or a raw
    /// bucket object name.
    pub fn object_name(&self, reference: &str) -> Result<String> {
        let normalized = self.inner.paths.normalize_entity_path(reference);
        let name = if normalized.starts_with(OBJECTS_PREFIX) {
            self.inner.paths.entity_name(&normalized)?
        } else {
            normalized.trim_start_matches('/').to_string()
        };
        if name.is_empty() {
            return Err(AclError::InvalidPath(reference.to_string()));
        }
        Ok(name)
    }

    /// Like `object_name`, and the object must exist.
    pub async fn resolve_object(&self, reference: &str) -> Result<String> {
        let name = self.object_name(reference)?;
        if !self.inner.bucket.exists(&name).await? {
            return Err(AclError::ObjectNotFound(reference.to_string()));
        }
        Ok(name)
    }

    pub async fn get_policy(&self, reference: &str) -> Result<Option<AccessPolicy>> {
        let name = self.resolve_object(reference).await?;
        self.inner.evaluator.store().get_policy(&name).await
    }

    pub async fn set_policy(&self, reference: &str, policy: &AccessPolicy) -> Result<()> {
        let name = self.resolve_object(reference).await?;
        self.inner.evaluator.store().set_policy(&name, policy).await?;
        self.inner.metrics.policy_writes.inc(&[]);
        Ok(())
    }

    pub async fn decide(
        &self,
        requester: Option<&str>,
        reference: &str,
        requested: Permission,
    ) -> Result<AccessDecision> {
        // Resolution failures never reach the evaluator; count them here.
        let name = match self.resolve_object(reference).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(
                    object = %reference,
                    requester = requester.unwrap_or("-"),
                    permission = %requested,
                    code = e.code().as_str(),
                    error = %e,
                    "access evaluation failed"
                );
                self.inner.metrics.evaluation_errors.inc(&[("code", e.code().as_str())]);
                return Err(e);
            }
        };
        self.inner.evaluator.decide(requester, &name, requested).await
    }

    pub async fn can_access(
        &self,
        requester: Option<&str>,
        reference: &str,
        requested: Permission,
    ) -> Result<bool> {
        Ok(self.decide(requester, reference, requested).await?.is_allowed())
    }
}
