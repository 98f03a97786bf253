//! Repository assistant configuration store.
//!
//! This crate provides:
//! - [`ConfigStore`]: an in-memory index of named configuration documents
//!   kept consistent with a directory of on-disk JSON files
//! - Create-or-replace with an explicit overwrite gate, lookup by name,
//!   and content-matched delete
//! - Typed errors with stable codes for the boundary layer

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ConfigStore;
