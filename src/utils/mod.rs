//! Utilities Module
//!
//! Common utilities used across the crate.

pub mod config;
pub mod logging;

pub use config::ServiceConfig;
