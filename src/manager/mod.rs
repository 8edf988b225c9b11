//! Zone manager orchestrator.
//!
//! The manager owns the current zone generation and closes the feedback loop
//! between selection, usage tracking and rebalancing. Multi-threaded hosts
//! must serialize every `&mut self` call behind one lock.

mod core;

pub use core::{Placement, ZoneManager};
