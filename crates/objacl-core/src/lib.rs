//! objacl core: object access-control policy model, permission algebra,
//! policy wire codec, and the shared error type.
//!
//! This crate carries no storage or runtime dependencies. It defines the
//! policy document attached to a stored object and the pure rules used to
//! interpret it, so the engine, tools and tests all agree on one contract.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A corrupt stored policy surfaces as `AclError`, never as a default policy.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod permission;
pub mod policy;

/// Shared result type.
pub use error::{AclError, ErrorCode, Result};
pub use permission::Permission;
pub use policy::{AccessPolicy, AccessRule, GroupRef, Visibility, ACL_POLICY_METADATA_KEY};
