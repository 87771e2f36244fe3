//! Pure domain layer for the quarry provisioning platform.
//!
//! Everything here is deterministic and free of I/O: entity types with
//! their wire shapes, name derivation, the vendor and init-package
//! catalogs, and the per-vendor resource generators. Controllers in
//! `quarry-control` combine these with a `quarry-cluster` client to do
//! the actual provisioning.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod commerce;
pub mod names;
pub mod stack;
pub mod types;
