//! Shared test utilities for searchpane.

pub mod fixtures;
pub mod mock_server;
