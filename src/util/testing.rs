//! Shared setup for unit and integration tests.

use std::env;
use std::sync::Once;

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Install a stderr subscriber once per test binary; honours `RUST_LOG`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "sankey_tree=debug");
        }
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if !tracing::dispatcher::has_been_set() {
            subscriber.try_init().unwrap_or_else(|e| {
                eprintln!("Error: Failed to set up logging: {}", e);
            });
        }
        info!("Test setup complete");
    });
}
