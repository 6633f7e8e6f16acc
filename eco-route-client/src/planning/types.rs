//! Eco-planning API wire types.
//!
//! These mirror the backend's JSON. Free-form parts the client only passes
//! through (route geometry, score breakdowns) stay as `serde_json::Value`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::TransportMode;

/// A `{lon, lat}` pair as echoed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Response of `GET /eco/plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningResult {
    #[serde(default)]
    pub start_location: Option<LonLat>,

    #[serde(default)]
    pub end_location: Option<LonLat>,

    #[serde(default)]
    pub environmental_conditions: EnvironmentalConditions,

    /// Options ranked by eco score, best first.
    pub route_options: Vec<RouteOption>,

    #[serde(default)]
    pub recommended_route: Option<RouteOption>,

    #[serde(default)]
    pub summary: Summary,
}

impl PlanningResult {
    /// The option for `mode`, if the backend returned one.
    pub fn route(&self, mode: TransportMode) -> Option<&RouteOption> {
        self.route_options.iter().find(|option| option.mode == mode)
    }

    /// Modes present in this result, in ranking order.
    pub fn modes(&self) -> impl Iterator<Item = TransportMode> + '_ {
        self.route_options.iter().map(|option| option.mode)
    }
}

/// One candidate route. Identified within a result by its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOption {
    pub mode: TransportMode,
    pub route_details: RouteDetails,
    pub eco_analysis: EcoAnalysis,
    pub estimated_emissions: Emissions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub distance_km: f64,
    pub duration_min: f64,

    /// GeoJSON geometry, handed to the map untouched.
    #[serde(default)]
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoAnalysis {
    /// 0-100, higher is greener.
    pub eco_score: f64,

    /// "Excellent", "Good", "Fair", "Poor" or "Very Poor".
    pub rating: String,

    #[serde(default)]
    pub recommendations: Vec<String>,

    #[serde(default)]
    pub score_breakdown: serde_json::Value,

    #[serde(default)]
    pub factors: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emissions {
    pub total_co2_grams: f64,
    pub co2_per_km: f64,
    pub equivalent_trees_needed: f64,
}

/// Weather and air quality at the destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalConditions {
    #[serde(default)]
    pub weather: Weather,

    #[serde(default)]
    pub air_quality: AirQuality,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Preformatted, e.g. "31.2 °C" or "N/A".
    pub temperature: Option<String>,
    pub condition: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    /// OpenWeather scale, 1 (good) to 5 (very poor).
    pub air_quality_index: Option<u8>,

    /// Pollutant concentrations in μg/m³, keyed by pollutant.
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub best_eco_score: f64,

    #[serde(default)]
    pub total_options_analyzed: usize,

    #[serde(default)]
    pub environmental_status: String,
}

/// Response of `GET /eco/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub route_comparison: Vec<ModeComparison>,

    #[serde(default)]
    pub best_option: Option<ModeComparison>,

    #[serde(default)]
    pub environmental_summary: String,
}

/// Flattened per-mode figures from `/eco/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeComparison {
    pub mode: TransportMode,
    pub eco_score: f64,
    pub rating: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub co2_emissions: f64,

    #[serde(default)]
    pub top_recommendation: Option<String>,
}

/// Response of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    #[serde(default)]
    pub message: String,
}
