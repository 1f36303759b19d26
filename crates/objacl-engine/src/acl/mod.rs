//! Object access control.
//!
//! - `policy_store`: read/write the policy attached to an object's metadata.
//! - `groups`: pluggable group resolution (empty unless the application registers types).
//! - `evaluator`: the allow/deny decision.

pub mod evaluator;
pub mod groups;
pub mod policy_store;

pub use evaluator::{evaluate, AccessDecision, PermissionEvaluator};
pub use groups::{AccessGroup, GroupRegistry, GroupResolver};
pub use policy_store::AccessPolicyStore;
