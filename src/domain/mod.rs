//! Shared domain types.
//!
//! ## Files
//! - `models.rs` — instance status snapshots, uptime statistics,
//!   configuration properties, connection passphrase.

pub mod models;
