//! Shared utilities for the vouch workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
