use thiserror::Error;

/// Unified result type for the scatter engine.
pub type Result<T> = std::result::Result<T, ScatterError>;

/// Errors surfaced by the zone distribution engine.
///
/// Stale zone references passed to usage/release bookkeeping are not errors;
/// they are ignored. `UnknownZone` is only returned by calls that cannot do
/// anything meaningful without the zone.
#[derive(Debug, Error)]
pub enum ScatterError {
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("zone `{0}` not found")]
    UnknownZone(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown selection strategy `{0}`")]
    UnknownStrategy(String),
    #[error("unknown zone kind `{0}`")]
    UnknownZoneKind(String),
    #[error("configuration parse error: {0}")]
    Serde(#[from] serde_json::Error),
}
