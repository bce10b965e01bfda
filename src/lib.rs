//! # SDI OS API client
//!
//! Re-exports the client core from `sdios-api` and adds process-level
//! logging setup for applications embedding it.

pub mod logging;

pub use sdios_api::*;
