//! Secret-store collaborator interface for quarry.
//!
//! The provisioning layer keeps generated per-instance credentials in an
//! encrypted key-value store addressed by slash-separated paths. The
//! store is an external collaborator behind the [`SecretStore`] trait;
//! [`MemorySecrets`] is the in-process implementation used by tests and
//! local development.

#![forbid(unsafe_code)]

mod error;
mod memory;
mod traits;

pub use error::{SecretsError, SecretsResult};
pub use memory::MemorySecrets;
pub use traits::{SecretMap, SecretStore};
