//! # limitwatch_core
//!
//! Core domain logic for Limitwatch: contract storage, the Marketing Cloud
//! client, Slack alert delivery, and the periodic check scheduler.

pub mod checker;
pub mod config;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod sfmc;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
