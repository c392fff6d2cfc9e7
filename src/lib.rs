//! geohazard library
//!
//! Provider clients, the risk heuristic, session orchestration and the TUI,
//! exposed for the binary and for integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod report;
pub mod risk;
pub mod session;
pub mod ui;
