//! Zone selection strategies.
//!
//! Strategies read zone statistics and the recent history; they never mutate
//! either. The random draw is supplied by the caller so the manager owns the
//! only RNG.

mod core;

pub use core::{
    CENTER_PROBABILITY, Candidate, MOBILE_CENTER_PROBABILITY, SelectionContext, SelectionStrategy,
    effective_weight, roulette, select,
};
