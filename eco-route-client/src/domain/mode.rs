//! Transport modes understood by the eco-planning backend.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unrecognised mode identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {0:?} (expected driving-car, cycling-regular or foot-walking)")]
pub struct UnknownMode(String);

/// A transport mode.
///
/// The identifiers must match the backend vocabulary exactly, so modes are
/// a closed set rather than free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransportMode {
    #[serde(rename = "driving-car")]
    DrivingCar,
    #[serde(rename = "cycling-regular")]
    CyclingRegular,
    #[serde(rename = "foot-walking")]
    FootWalking,
}

impl TransportMode {
    /// Every mode, in presentation order.
    pub const ALL: [TransportMode; 3] = [
        TransportMode::DrivingCar,
        TransportMode::CyclingRegular,
        TransportMode::FootWalking,
    ];

    /// Backend identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::DrivingCar => "driving-car",
            TransportMode::CyclingRegular => "cycling-regular",
            TransportMode::FootWalking => "foot-walking",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::DrivingCar => "Car",
            TransportMode::CyclingRegular => "Bicycle",
            TransportMode::FootWalking => "Walking",
        }
    }

    /// Parse a backend identifier.
    pub fn parse(s: &str) -> Result<Self, UnknownMode> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

impl FromStr for TransportMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independently toggled mode selection (zero or more modes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSet(BTreeSet<TransportMode>);

impl ModeSet {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All modes selected.
    pub fn all() -> Self {
        TransportMode::ALL.into_iter().collect()
    }

    /// Flip a mode. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, mode: TransportMode) -> bool {
        if self.0.remove(&mode) {
            false
        } else {
            self.0.insert(mode);
            true
        }
    }

    pub fn insert(&mut self, mode: TransportMode) {
        self.0.insert(mode);
    }

    pub fn remove(&mut self, mode: TransportMode) {
        self.0.remove(&mode);
    }

    pub fn contains(&self, mode: TransportMode) -> bool {
        self.0.contains(&mode)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TransportMode> + '_ {
        self.0.iter().copied()
    }

    /// Comma-joined identifiers, as sent in the `modes` query parameter.
    pub fn query_value(&self) -> String {
        self.iter()
            .map(TransportMode::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<TransportMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = TransportMode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_roundtrip() {
        for mode in TransportMode::ALL {
            assert_eq!(TransportMode::parse(mode.as_str()), Ok(mode));
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert!(TransportMode::parse("driving-hgv").is_err());
        assert!(TransportMode::parse("Driving-Car").is_err());
        assert!("".parse::<TransportMode>().is_err());

        let err = TransportMode::parse("wheelchair").unwrap_err();
        assert!(err.to_string().contains("\"wheelchair\""));
    }

    #[test]
    fn serde_uses_backend_identifiers() {
        let json = serde_json::to_string(&TransportMode::CyclingRegular).unwrap();
        assert_eq!(json, "\"cycling-regular\"");

        let mode: TransportMode = serde_json::from_str("\"foot-walking\"").unwrap();
        assert_eq!(mode, TransportMode::FootWalking);

        assert!(serde_json::from_str::<TransportMode>("\"driving-hgv\"").is_err());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut modes = ModeSet::new();
        assert!(modes.is_empty());

        assert!(modes.toggle(TransportMode::FootWalking));
        assert!(modes.contains(TransportMode::FootWalking));

        assert!(!modes.toggle(TransportMode::FootWalking));
        assert!(modes.is_empty());
    }

    #[test]
    fn query_value_in_presentation_order() {
        let modes: ModeSet = [TransportMode::FootWalking, TransportMode::DrivingCar]
            .into_iter()
            .collect();
        assert_eq!(modes.query_value(), "driving-car,foot-walking");

        assert_eq!(
            ModeSet::all().query_value(),
            "driving-car,cycling-regular,foot-walking"
        );
        assert_eq!(ModeSet::new().query_value(), "");
    }
}
