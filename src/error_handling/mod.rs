//! Error handling.
//!
//! This module provides:
//! - Error type definitions for the request pipeline, file store and initialization
//! - Categorization of transport errors into `NetworkErrorKind`

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{FileStoreError, HttpToolError, InitializationError, NetworkErrorKind};
