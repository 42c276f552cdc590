//! # Pass Scan
//!
//! This crate watches library museum passes for copies that are on the shelf
//! but cannot be held remotely, and emails an alert when any turn up at the
//! configured branches.

/// Client for the BiblioCommons availability API and the branch matcher
mod bibliocommons_client;
pub use bibliocommons_client::*;

/// Runtime configuration loaded from the environment
mod config;
pub use config::*;

/// Email delivery backends
mod email_service;
pub use email_service::*;

/// Polling loop alternating between the search and found intervals
mod executor;
pub use executor::*;

/// Alert composition and delivery
mod notification_service;
pub use notification_service::*;

/// Shared types and errors
mod scan_types;
pub use scan_types::*;
