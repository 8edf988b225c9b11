//! Zone-based spatial distribution engine.
//!
//! The viewport is partitioned into thirteen weighted zones (edge bands,
//! center tiles and corner transitions). Callers ask a `ZoneManager` for a
//! zone, report usage and release, and the manager rebalances weights so
//! placements spread organically instead of clustering. `ResponsiveAdapter`
//! layers debounced resize handling and device signals on top.

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod responsive;
pub mod strategy;
pub mod tracker;
pub mod zone;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{AspectClass, ZoneConfig, ZoneWeights};
pub use error::{Result, ScatterError};
pub use geometry::{Bounds, Orientation, Point, Span, Viewport};
pub use layout::{ZONE_COUNT, ZoneLayout};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use manager::{Placement, ZoneManager};
pub use metrics::{EngineMetrics, MetricSnapshot};
pub use responsive::{DeviceSignals, DeviceTier, ResponsiveAdapter, ResponsiveConfig};
pub use strategy::SelectionStrategy;
pub use tracker::{DistributionHistory, DistributionStats, RebalanceReport, ZoneTypeCounts};
pub use zone::{Zone, ZoneId, ZoneKind, ZoneView};
