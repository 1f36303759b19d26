//! objacl engine library entry.
//!
//! This crate wires the backing object store, policy store, group registry,
//! permission evaluator, metrics and config into a cohesive access layer. It
//! is consumed by the `objacl` binary (`main.rs`), by integration tests, and
//! by applications embedding the engine.

pub mod acl;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod storage;
