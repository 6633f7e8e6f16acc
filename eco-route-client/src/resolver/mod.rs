//! Location input fields.
//!
//! A field turns keystrokes into a resolved `Location`: typing pauses are
//! debounced, coordinate pairs resolve immediately, everything else is
//! looked up through a `GeocodeSearch`. Only the newest query can ever
//! update the field; answers to superseded queries are dropped on arrival.

mod machine;
mod task;

pub use machine::{Effect, FieldMachine, FieldSnapshot, Phase, SearchState};
pub use task::{LocationResolver, ResolverClosed, ResolverConfig, ResolverHandle};
