use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use objacl_core::error::{AclError, Result};
use objacl_core::GroupRef;

/// A set of identities that a rule can grant a permission to.
///
/// Membership checks may hit a remote directory, so they are async.
#[async_trait]
pub trait AccessGroup: Send + Sync {
    async fn has_member(&self, user_id: &str) -> Result<bool>;
}

/// Builds the concrete group for one group type tag.
pub trait GroupResolver: Send + Sync {
    fn group_type(&self) -> &str;
    fn resolve(&self, group: &GroupRef) -> Result<Arc<dyn AccessGroup>>;
}

/// Registry of group types supplied by the embedding application.
///
/// Empty by default: no concrete group kinds ship with the engine, and an
/// unregistered type always fails with `UnknownGroupType` instead of
/// resolving to "no members" or "everyone".
#[derive(Default)]
pub struct GroupRegistry {
    resolvers: DashMap<String, Arc<dyn GroupResolver>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            resolvers: DashMap::new(),
        }
    }

    /// Register a resolver. A later registration of the same type replaces the earlier one.
    pub fn register(&self, resolver: Arc<dyn GroupResolver>) {
        let ty = resolver.group_type().to_string();
        if self.resolvers.insert(ty.clone(), resolver).is_some() {
            tracing::warn!(group_type = %ty, "group resolver replaced");
        }
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut out: Vec<String> = self.resolvers.iter().map(|e| e.key().clone()).collect();
        out.sort();
        out
    }

    pub fn is_registered(&self, group_type: &str) -> bool {
        self.resolvers.contains_key(group_type)
    }

    pub fn resolve(&self, group: &GroupRef) -> Result<Arc<dyn AccessGroup>> {
        let resolver = self
            .resolvers
            .get(group.group_type.as_str())
            .ok_or_else(|| AclError::UnknownGroupType(group.group_type.clone()))?
            .value()
            .clone();
        resolver.resolve(group)
    }
}
