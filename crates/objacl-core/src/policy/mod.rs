//! Access policy document (model + JSON codec).
//!
//! A policy is attached to exactly one stored object as a single metadata
//! value. It is either wholly present or absent:
//! - `model`: owner, visibility and group rules.
//! - `codec`: strict JSON encode/decode under a reserved metadata key.
//!
//! Decoding is panic-free and fails closed: a value that is not a valid
//! policy is reported as `AclError::PolicyDeserialization`, never coerced
//! into an empty or default policy.

pub mod codec;
pub mod model;

pub use codec::{decode_policy, encode_policy, ACL_POLICY_METADATA_KEY};
pub use model::{AccessPolicy, AccessRule, GroupRef, Visibility};
