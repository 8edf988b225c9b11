//! Layout module orchestrator.
//!
//! Downstream code imports layout types from here while the builder and the
//! zone collection live in the private `core` module.

mod core;

pub use core::{
    CENTER_ZONE_COUNT, EDGE_ZONE_COUNT, TRANSITION_ZONE_COUNT, ZONE_COUNT, ZoneLayout, build,
    signature,
};
