//! Utility helpers around the request pipeline.
//!
//! This module provides:
//! - Cookie header string decoding
//! - File store helpers for persisting captured data
//! - Regex match/replace helpers
//! - Random number and string generation

mod cookie_header;
pub mod file_store;
pub mod pattern;
mod random;

pub use cookie_header::decode_cookie_header;
pub use random::{RandomSource, ALPHANUMERIC, DEFAULT_LETTERS};
