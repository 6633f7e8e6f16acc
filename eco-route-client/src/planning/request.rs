//! Validated planning requests.

use crate::domain::{Location, ModeSet};

/// Problems caught before anything is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please choose a start location.")]
    MissingStart,

    #[error("Please choose a destination.")]
    MissingEnd,

    #[error("Please select at least one transport mode.")]
    NoModes,
}

/// A request the backend can accept: both ends resolved, at least one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    start: Location,
    end: Location,
    modes: ModeSet,
}

impl PlanRequest {
    /// Validate form inputs into a request.
    pub fn new(
        start: Option<Location>,
        end: Option<Location>,
        modes: ModeSet,
    ) -> Result<Self, ValidationError> {
        let start = start.ok_or(ValidationError::MissingStart)?;
        let end = end.ok_or(ValidationError::MissingEnd)?;

        if modes.is_empty() {
            return Err(ValidationError::NoModes);
        }

        Ok(Self { start, end, modes })
    }

    pub fn start(&self) -> &Location {
        &self.start
    }

    pub fn end(&self) -> &Location {
        &self.end
    }

    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    /// Query parameters for `GET /eco/plan`. Coordinates are `lng,lat`.
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("start", self.start.to_query_param()),
            ("end", self.end.to_query_param()),
            ("modes", self.modes.query_value()),
        ]
    }
}
