//! Geocoding provider wire types.

use serde::{Deserialize, Serialize};

use crate::domain::{InvalidLocation, Location};

/// One geocoding suggestion.
///
/// Coordinates stay textual, exactly as the provider sent them, until the
/// user picks the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl GeocodeResult {
    pub fn new(
        display_name: impl Into<String>,
        lat: impl Into<String>,
        lon: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    /// The location this suggestion resolves to, labelled with its display name.
    pub fn to_location(&self) -> Result<Location, InvalidLocation> {
        Location::from_text(&self.lat, &self.lon, self.display_name.as_str())
    }
}
