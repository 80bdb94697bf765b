//! Service layer containing the daemon-facing logic and report helpers.
//!
//! ## Service map
//! - `endpoint.rs` — control endpoint resolution and socket discovery.
//! - `control.rs` — one blocking request/response exchange.
//! - `repository.rs` — status snapshot fetch/parse/sort.
//! - `selector.rs` — glob matching and snapshot partitioning.
//! - `dispatch.rs` — sequential per-target dispatch with outcome
//!   aggregation.
//! - `render.rs` — width-aware status rendering, durations, truncation.
//! - `properties.rs` — property tables and local-over-default resolution.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod control;
pub mod dispatch;
pub mod endpoint;
pub mod properties;
pub mod render;
pub mod repository;
pub mod selector;
