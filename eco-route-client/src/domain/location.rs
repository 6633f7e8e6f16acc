//! Geographic location types.

use std::fmt;

/// Error returned when a coordinate pair is not a valid location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// A resolved point on the map, optionally labelled with an address.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180];
/// any `Location` value is valid by construction. Locations are never
/// mutated: new input produces a new value.
///
/// # Examples
///
/// ```
/// use eco_route_client::domain::Location;
///
/// let chennai = Location::new(13.0827, 80.2707).unwrap();
/// assert_eq!(chennai.display_text(), "13.0827, 80.2707");
///
/// // Out of range is rejected
/// assert!(Location::new(91.0, 0.0).is_err());
/// assert!(Location::new(0.0, 181.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    lat: f64,
    lng: f64,
    address: Option<String>,
}

impl Location {
    /// Create a location from a latitude/longitude pair.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidLocation> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidLocation {
                reason: "coordinates must be finite",
            });
        }

        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidLocation {
                reason: "latitude must be within [-90, 90]",
            });
        }

        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidLocation {
                reason: "longitude must be within [-180, 180]",
            });
        }

        Ok(Self {
            lat,
            lng,
            address: None,
        })
    }

    /// Create a location labelled with an address.
    pub fn with_address(
        lat: f64,
        lng: f64,
        address: impl Into<String>,
    ) -> Result<Self, InvalidLocation> {
        let mut location = Self::new(lat, lng)?;
        location.address = Some(address.into());
        Ok(location)
    }

    /// Create a labelled location from textual coordinates, as sent by
    /// geocoding providers.
    pub fn from_text(
        lat: &str,
        lng: &str,
        address: impl Into<String>,
    ) -> Result<Self, InvalidLocation> {
        let not_numeric = InvalidLocation {
            reason: "coordinates must be numeric",
        };
        let lat: f64 = lat.trim().parse().map_err(|_| not_numeric.clone())?;
        let lng: f64 = lng.trim().parse().map_err(|_| not_numeric)?;
        Self::with_address(lat, lng, address)
    }

    /// Parse a `"lat, lng"` pair typed directly by the user.
    ///
    /// Each component must be an optionally negative decimal number
    /// (`13`, `-13.05`, `13.`); whitespace is allowed around the comma and
    /// at either end. Returns `None` for anything else, including pairs that
    /// are well-formed but out of range.
    pub fn parse_coordinates(input: &str) -> Option<Self> {
        let (lat, lng) = input.trim().split_once(',')?;
        let lat = parse_decimal(lat.trim())?;
        let lng = parse_decimal(lng.trim())?;
        Self::new(lat, lng).ok()
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// The address label, if this location came from a geocoding result.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Text shown in the input field for this location.
    ///
    /// The address when present, otherwise `"lat, lng"`.
    pub fn display_text(&self) -> String {
        match &self.address {
            Some(address) => address.clone(),
            None => format!("{}, {}", self.lat, self.lng),
        }
    }

    /// The backend's coordinate format: `"lng,lat"`, longitude first.
    pub fn to_query_param(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Parse `-?digits(.digits*)?`, rejecting exponents, `inf`, `nan` and signs
/// that `f64::from_str` would otherwise accept.
fn parse_decimal(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if int.is_empty()
        || !int.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    s.parse().ok()
}
