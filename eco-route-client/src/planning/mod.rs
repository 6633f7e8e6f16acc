//! Eco-planning backend client and session.
//!
//! The backend ranks routes for each requested transport mode by an eco
//! score built from distance, weather and air quality. This module sends
//! validated requests, keeps the newest result, and tracks which route the
//! user is looking at.

mod client;
mod error;
mod request;
mod selection;
mod session;
mod types;

pub use client::{EcoApiClient, EcoApiConfig};
pub use error::{FALLBACK_MESSAGE, PlanningError};
pub use request::{PlanRequest, ValidationError};
pub use selection::{SelectionEvent, SelectionState};
pub use session::{PlanOutcome, PlanningBackend, RoutePlanningSession, SessionSnapshot};
pub use types::{
    AirQuality, CompareResponse, EcoAnalysis, Emissions, EnvironmentalConditions,
    HealthResponse, LonLat, ModeComparison, PlanningResult, RouteDetails, RouteOption, Summary,
    Weather,
};
