#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use objacl_core::error::{AclError, Result};
use objacl_core::{GroupRef, ACL_POLICY_METADATA_KEY};
use objacl_engine::acl::{AccessGroup, AccessPolicyStore, GroupRegistry, GroupResolver, PermissionEvaluator};
use objacl_engine::storage::{MemoryBucket, ObjectBucket, ObjectMetadata};

/// Fixed team membership, standing in for an application directory.
pub struct TeamGroup {
    members: HashSet<String>,
}

#[async_trait]
impl AccessGroup for TeamGroup {
    async fn has_member(&self, user_id: &str) -> Result<bool> {
        Ok(self.members.contains(user_id))
    }
}

#[derive(Default)]
pub struct TeamResolver {
    teams: HashMap<String, HashSet<String>>,
}

impl TeamResolver {
    pub fn with_team(mut self, id: &str, members: &[&str]) -> Self {
        self.teams
            .insert(id.to_string(), members.iter().map(|m| m.to_string()).collect());
        self
    }
}

impl GroupResolver for TeamResolver {
    fn group_type(&self) -> &str {
        "team"
    }

    fn resolve(&self, group: &GroupRef) -> Result<Arc<dyn AccessGroup>> {
        let members = self.teams.get(&group.id).cloned().unwrap_or_default();
        Ok(Arc::new(TeamGroup { members }))
    }
}

/// Directory that is down: every membership lookup fails.
pub struct OfflineGroup;

#[async_trait]
impl AccessGroup for OfflineGroup {
    async fn has_member(&self, _user_id: &str) -> Result<bool> {
        Err(AclError::Storage("directory unavailable".into()))
    }
}

pub struct OfflineResolver;

impl GroupResolver for OfflineResolver {
    fn group_type(&self) -> &str {
        "directory"
    }

    fn resolve(&self, _group: &GroupRef) -> Result<Arc<dyn AccessGroup>> {
        Ok(Arc::new(OfflineGroup))
    }
}

pub struct Fixture {
    pub bucket: Arc<MemoryBucket>,
    pub store: AccessPolicyStore,
    pub evaluator: PermissionEvaluator,
}

/// Memory bucket with the given objects, `team:t1 = {u3}` registered.
pub async fn fixture(objects: &[&str]) -> Fixture {
    let bucket = Arc::new(MemoryBucket::new("test-bucket"));
    for o in objects {
        bucket.put(o, b"payload".to_vec()).await.unwrap();
    }

    let groups = GroupRegistry::new();
    groups.register(Arc::new(TeamResolver::default().with_team("t1", &["u3"])));
    groups.register(Arc::new(OfflineResolver));

    let store = AccessPolicyStore::new(bucket.clone());
    let evaluator = PermissionEvaluator::new(store.clone(), Arc::new(groups));
    Fixture {
        bucket,
        store,
        evaluator,
    }
}

/// Write a raw metadata value under the policy key, bypassing encoding.
pub async fn write_raw_policy(bucket: &MemoryBucket, object: &str, raw: &str) {
    let mut md = ObjectMetadata::new();
    md.insert(ACL_POLICY_METADATA_KEY.to_string(), raw.to_string());
    bucket.patch_metadata(object, md).await.unwrap();
}
