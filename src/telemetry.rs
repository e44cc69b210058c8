//! Tracing setup for the server binary.
//!
//! Log targets used across the crate:
//! - `quiz`: bank inventory at startup, run transitions and completions
//! - `theme`: resolution, applied/dropped changes, rejected values
//! - `cyberkids_backend`: config loading, listener, shutdown, request failures
//!
//! `LOG_LEVEL` overrides [`DEFAULT_FILTER`]; `LOG_FORMAT=json` emits one JSON
//! object per event for log shippers.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,quiz=debug,theme=debug,cyberkids_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(!json)
        .with_line_number(!json);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
