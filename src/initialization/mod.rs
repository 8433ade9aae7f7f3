//! Process-level initialization.
//!
//! The library itself never installs a logger; binaries and test harnesses
//! call [`init_logger`] or [`init_logger_with`] once at startup.

mod logger;

pub use logger::init_logger_with;

use crate::config::{LogFormat, LogLevel};
use crate::error_handling::InitializationError;

/// Initializes the logger from the crate's logging configuration types.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger(level: LogLevel, format: LogFormat) -> Result<(), InitializationError> {
    init_logger_with(level.into(), format)
}
