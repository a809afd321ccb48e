//! Terminal client for the résumé screening service.
//!
//! This library provides the HTTP adapters, configuration, command parsing
//! and the interactive shell used by the rs_client binary.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod identity_client;
pub mod logging;
pub mod shell;
