//! Configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, redirect limit, default header values)
//! - The immutable default header set merged into every request
//! - Logging configuration types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::DefaultHeaders;
pub(crate) use headers::parse_header;
pub use types::{LogFormat, LogLevel};
