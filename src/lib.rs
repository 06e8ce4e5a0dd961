pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod render;
pub mod settings;
#[cfg(test)]
pub mod test_utils;
pub mod tui;

pub use error::{Result, SpError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
