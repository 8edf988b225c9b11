//! Zone module orchestrator.
//!
//! Callers import zone types from here while the implementation lives in the
//! private `core` module.

mod core;

pub use core::{Zone, ZoneId, ZoneKind, ZoneView};
