//! # gatepass-kiosk
//!
//! The kiosk core the UI screens call into: an async [`GateService`] over the
//! local store, the check-in form and its mobile verification, check-out,
//! audit logging, visitor statistics and CSV reports.

pub mod checkin;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod service;
pub mod stats;

use tracing_subscriber::{fmt, EnvFilter};

pub use checkin::CheckInForm;
pub use config::KioskConfig;
pub use error::{KioskError, Result};
pub use service::GateService;
pub use stats::{StatsPoller, VisitorStats};

/// Install the global tracing subscriber (respects `RUST_LOG`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gatepass_kiosk=debug,gatepass_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
