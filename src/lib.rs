//! Jitsi call provider for web conferencing.
//!
//! Validates the provider's startup parameters, keeps its runtime
//! [`providers::Settings`] in a key/value [`store`], and serves the admin API
//! that replaces them.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod providers;
pub mod store;
