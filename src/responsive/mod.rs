//! Responsive adapter orchestrator.
//!
//! `ResponsiveAdapter` wraps a `ZoneManager` and turns viewport and device
//! signals into debounced layout rebuilds and strategy overrides. The manager
//! itself stays unaware of devices.

mod core;

pub use core::{DeviceSignals, DeviceTier, PendingResize, ResponsiveAdapter, ResponsiveConfig};
