//! Error orchestrator. Types live in the private `types` module.

mod types;

pub use types::{Result, ScatterError};
