//! Shared helpers.
//!
//! - [`encoding`] - little-endian readers and writers for the binary formats

pub mod encoding;

pub use encoding::*;
