//! Eco route planner client.
//!
//! Turns what a user types into two resolved locations, asks the
//! eco-planning backend for routes in the chosen transport modes, and keeps
//! track of which of the returned routes is selected.
//!
//! Every event (keystroke, timer, network completion, pick) is applied by a
//! single owner, and answers to superseded requests are dropped on arrival.

pub mod config;
pub mod domain;
pub mod form;
pub mod geocode;
pub mod health;
pub mod planning;
pub mod render;
pub mod resolver;
