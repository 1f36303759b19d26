use std::sync::Arc;
use std::time::Instant;

use objacl_core::error::Result;
use objacl_core::{AccessPolicy, Permission};

use super::groups::GroupRegistry;
use super::policy_store::AccessPolicyStore;
use crate::obs::AclMetrics;

/// Outcome of one access check, with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Object carries no policy: deny.
    NoPolicy,
    /// Public object, read requested: allow.
    PublicRead,
    /// No identity and the public shortcut did not apply: deny.
    Anonymous,
    /// Requester owns the object: allow.
    Owner,
    /// Rule at `index` grants a sufficient permission to a group the requester is in: allow.
    RuleMatch { index: usize },
    /// No rule applies: deny.
    NoMatchingRule,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            AccessDecision::PublicRead | AccessDecision::Owner | AccessDecision::RuleMatch { .. }
        )
    }

    /// Metrics/log label.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDecision::NoPolicy => "no_policy",
            AccessDecision::PublicRead => "public_read",
            AccessDecision::Anonymous => "anonymous",
            AccessDecision::Owner => "owner",
            AccessDecision::RuleMatch { .. } => "rule_match",
            AccessDecision::NoMatchingRule => "no_matching_rule",
        }
    }

    pub fn outcome(&self) -> &'static str {
        if self.is_allowed() {
            "allow"
        } else {
            "deny"
        }
    }
}

/// Decide access against an already-loaded policy.
///
/// Order: no policy -> public read -> anonymous -> owner -> group rules.
/// Every rule's group is resolved before any membership lookup, so an
/// unregistered group type fails the whole check no matter where the rule
/// sits in the list. Membership lookups then run in rule order and stop at
/// the first match or the first lookup error, so a failing group listed
/// after a matching one is never consulted. An empty requester id counts as
/// anonymous.
pub async fn evaluate(
    policy: Option<&AccessPolicy>,
    requester: Option<&str>,
    requested: Permission,
    groups: &GroupRegistry,
) -> Result<AccessDecision> {
    let Some(policy) = policy else {
        return Ok(AccessDecision::NoPolicy);
    };

    if policy.is_public() && requested == Permission::Read {
        return Ok(AccessDecision::PublicRead);
    }

    let Some(user) = requester.filter(|u| !u.is_empty()) else {
        return Ok(AccessDecision::Anonymous);
    };

    if policy.owner == user {
        return Ok(AccessDecision::Owner);
    }

    let resolved = policy
        .acl_rules
        .iter()
        .map(|rule| groups.resolve(&rule.group))
        .collect::<Result<Vec<_>>>()?;

    for (index, (rule, group)) in policy.acl_rules.iter().zip(resolved).enumerate() {
        if !rule.permission.satisfies(requested) {
            continue;
        }
        if group.has_member(user).await? {
            return Ok(AccessDecision::RuleMatch { index });
        }
    }

    Ok(AccessDecision::NoMatchingRule)
}

/// Answers "may this identity do this to this object", with one policy read per call.
#[derive(Clone)]
pub struct PermissionEvaluator {
    store: AccessPolicyStore,
    groups: Arc<GroupRegistry>,
    metrics: Option<Arc<AclMetrics>>,
}

impl PermissionEvaluator {
    pub fn new(store: AccessPolicyStore, groups: Arc<GroupRegistry>) -> Self {
        Self {
            store,
            groups,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AclMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &AccessPolicyStore {
        &self.store
    }

    pub fn groups(&self) -> &Arc<GroupRegistry> {
        &self.groups
    }

    /// Full decision, including why. Configuration problems are errors, not denials.
    pub async fn decide(
        &self,
        requester: Option<&str>,
        object: &str,
        requested: Permission,
    ) -> Result<AccessDecision> {
        let started = Instant::now();
        let res = self.decide_inner(requester, object, requested).await;

        match &res {
            Ok(d) => {
                tracing::debug!(
                    object = %object,
                    requester = requester.unwrap_or("-"),
                    permission = %requested,
                    outcome = d.outcome(),
                    reason = d.reason(),
                    "access decision"
                );
                if let Some(m) = &self.metrics {
                    m.decisions.inc(&[("outcome", d.outcome()), ("reason", d.reason())]);
                }
            }
            Err(e) => {
                tracing::warn!(
                    object = %object,
                    requester = requester.unwrap_or("-"),
                    permission = %requested,
                    code = e.code().as_str(),
                    error = %e,
                    "access evaluation failed"
                );
                if let Some(m) = &self.metrics {
                    m.evaluation_errors.inc(&[("code", e.code().as_str())]);
                }
            }
        }
        if let Some(m) = &self.metrics {
            m.evaluation_duration.observe(&[], started.elapsed());
        }
        res
    }

    async fn decide_inner(
        &self,
        requester: Option<&str>,
        object: &str,
        requested: Permission,
    ) -> Result<AccessDecision> {
        let policy = self.store.get_policy(object).await?;
        evaluate(policy.as_ref(), requester, requested, &self.groups).await
    }

    /// `true` to allow, `false` to deny; `Err` when the answer cannot be computed safely.
    pub async fn can_access(
        &self,
        requester: Option<&str>,
        object: &str,
        requested: Permission,
    ) -> Result<bool> {
        Ok(self.decide(requester, object, requested).await?.is_allowed())
    }
}
