//! foodbook-app library interface
//!
//! Outbound clients, status messages, settings and the command layer used by
//! the `foodbook` binary. Exposed as a library for integration testing.

pub mod cli;
pub mod clients;
pub mod commands;
pub mod config;
pub mod error;
pub mod status;

pub use crate::commands::App;
pub use crate::config::ClientSettings;
pub use crate::error::{ImportError, ImportResult};
pub use crate::status::{StatusKind, StatusMessage};
