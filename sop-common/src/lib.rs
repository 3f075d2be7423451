//! # SOP Common Library
//!
//! Shared code for the content-audit SOP tooling including:
//! - Error types
//! - TOML configuration loading, resolution and writing (including the
//!   `[logging]` filter level the binary hands to its subscriber)

pub mod config;
pub mod error;

pub use error::{Error, Result};
