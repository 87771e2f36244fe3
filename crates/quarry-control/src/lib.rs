//! Provisioning layer for the quarry platform.
//!
//! Wires the pure domain layer (`quarry-core`) to the cluster and
//! secret-store collaborators: single-resource controllers for each
//! vendor category, a toolbelt controller, a signed-URL issuer and the
//! [`Orchestrator`] that expands a client request into a complete stack
//! and executes it in a fixed order.

#![forbid(unsafe_code)]

pub mod config;
pub mod controllers;
pub mod error;
pub mod orchestrator;
pub mod signer;
pub mod toolbelt;

pub use config::ControlConfig;
pub use error::{ControlError, ControlResult};
pub use orchestrator::{Orchestrator, ProvisionOutcome};
pub use signer::{S3Signer, StaticSigner, UrlSigner};
pub use toolbelt::ToolbeltController;
