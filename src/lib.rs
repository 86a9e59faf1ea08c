pub mod app;
pub mod clients;
pub mod config;
mod error;
pub mod lead_magnets;
pub mod utils;
pub mod web;

// re-export
pub use app::{serve, App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Tracing setup for local development: ANSI colors, `RUST_LOG` respected,
/// defaults to `debug` for this crate.
pub fn init_dbg_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,leadgate=debug,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Tracing setup for production: no ANSI escapes so log collectors stay happy.
pub fn init_production_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
}
