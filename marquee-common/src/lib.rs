//! # Marquee Common Library
//!
//! Shared code for the Marquee title resolver:
//! - Error and result types
//! - TOML configuration loading and override resolution
//! - Decoration tables (genre emoji, country flags)
//! - Resolution progress events

pub mod config;
pub mod decorations;
pub mod error;
pub mod events;

pub use decorations::Decorations;
pub use error::{Error, Result};
