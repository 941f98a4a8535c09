// Shared helpers for presence calculus integration tests

#![allow(dead_code)]

use presence_calculus::presence::{Presence, PresenceEnd};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-captured subscriber honoring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Presence of `element` in the shared "queue" boundary
pub fn presence(element: &str, start: f64, end: impl Into<PresenceEnd>) -> Presence {
    Presence::from_ids(element, "queue", start, end).unwrap()
}

/// Four presences on `[0, 6)`: two closed early, one closed mid-way, one open
pub fn reference_presences() -> Vec<Presence> {
    vec![
        presence("a", 0.0, 2.0),
        presence("b", 1.5, 3.0),
        presence("c", 3.0, 4.5),
        presence("d", 4.6, PresenceEnd::Unbounded),
    ]
}
