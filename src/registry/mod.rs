// ABOUTME: Registry collaborator boundary for purge operations.
// ABOUTME: Exports the client trait, its error type, and listing records.

mod client;
mod error;
mod records;

pub use client::RegistryClient;
pub use error::RegistryError;
pub use records::{ChangeableAttributes, ManifestAttributes, TagAttributes};
