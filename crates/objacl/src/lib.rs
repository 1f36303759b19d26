//! Top-level facade crate for objacl.
//!
//! Re-exports the policy model and the evaluation engine so users can depend on a single crate.

pub mod core {
    pub use objacl_core::*;
}

pub mod engine {
    pub use objacl_engine::*;
}
