// ABOUTME: Library root for regsweep - concurrent registry purging.
// ABOUTME: Exposes the worker pool, purger, registry client trait, and config.

pub mod config;
pub mod error;
pub mod registry;
pub mod tags;
pub mod types;
pub mod worker;

pub use worker::{PurgeOutcome, Purger};
