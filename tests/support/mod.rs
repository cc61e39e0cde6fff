// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory registry mock and tracing setup for integration tests.

use std::sync::Once;

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod mock_registry;

#[allow(unused_imports)]
pub use mock_registry::MockRegistry;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("regsweep=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn repo(name: &str) -> regsweep::types::RepositoryName {
    regsweep::types::RepositoryName::new(name).unwrap()
}

#[allow(dead_code)]
pub fn tags(names: &[&str]) -> Vec<regsweep::types::TagName> {
    names
        .iter()
        .map(|n| regsweep::types::TagName::new(n).unwrap())
        .collect()
}

#[allow(dead_code)]
pub fn digests(values: &[&str]) -> Vec<regsweep::types::Digest> {
    values
        .iter()
        .map(|d| regsweep::types::Digest::parse(d).unwrap())
        .collect()
}
