//! # Common Components
//!
//! Shared utilities used by the server and CLI binaries.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing utilities
//! - [`logging`]: Log formatting and initialisation

pub mod config;
pub mod logging;
