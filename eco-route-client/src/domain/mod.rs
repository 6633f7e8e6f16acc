//! Domain types for the eco route planner.
//!
//! These types enforce their invariants at construction time: a `Location`
//! is always in range and a `TransportMode` is always one the backend
//! understands.

mod location;
mod mode;

pub use location::{InvalidLocation, Location};
pub use mode::{ModeSet, TransportMode, UnknownMode};
