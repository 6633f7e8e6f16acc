//! Askama templates for the terminal front end.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::planning::{
    AirQuality, CompareResponse, ModeComparison, PlanningResult, RouteOption, SelectionState,
    Weather,
};

// ============================================================================
// Templates
// ============================================================================

/// Planning result with every option ranked and the selection marked.
#[derive(Template)]
#[template(path = "score_card.txt")]
pub struct ScoreCardTemplate {
    pub analyzed: usize,
    pub best_score: String,
    pub planned_at: String,
    pub conditions: String,
    pub status: String,
    pub options: Vec<RouteOptionView>,
    /// Label of the selected option, empty if none.
    pub selected: String,
}

/// Output of `/eco/compare`.
#[derive(Template)]
#[template(path = "comparison.txt")]
pub struct ComparisonTemplate {
    pub rows: Vec<ComparisonView>,
    pub summary: String,
}

impl ScoreCardTemplate {
    /// Build the card for the current result and selection.
    ///
    /// Returns `None` if nothing has been planned.
    pub fn from_selection(
        selection: &SelectionState,
        planned_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        let result = selection.result()?;
        let selected = selection.selected_route();

        let options = result
            .route_options
            .iter()
            .enumerate()
            .map(|(i, option)| RouteOptionView::from_option(i + 1, option, result, selected))
            .collect();

        let planned_at = planned_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "just now".to_string());

        Some(Self {
            analyzed: result.summary.total_options_analyzed.max(result.route_options.len()),
            best_score: format!("{:.1}", best_score(result)),
            planned_at,
            conditions: conditions_line(
                &result.environmental_conditions.weather,
                &result.environmental_conditions.air_quality,
            ),
            status: result.summary.environmental_status.clone(),
            options,
            selected: selected.map(|r| r.mode.label().to_string()).unwrap_or_default(),
        })
    }
}

impl ComparisonTemplate {
    pub fn from_response(response: &CompareResponse) -> Self {
        let best = response.best_option.as_ref().map(|b| b.mode);
        Self {
            rows: response
                .route_comparison
                .iter()
                .map(|row| ComparisonView::from_comparison(row, best == Some(row.mode)))
                .collect(),
            summary: response.environmental_summary.clone(),
        }
    }
}

/// Render a planning result, or a short notice if there is none.
pub fn score_card(
    selection: &SelectionState,
    planned_at: Option<DateTime<Utc>>,
) -> Result<String, askama::Error> {
    match ScoreCardTemplate::from_selection(selection, planned_at) {
        Some(card) => card.render(),
        None => Ok("No route planned.\n".to_string()),
    }
}

// ============================================================================
// View Models
// ============================================================================

/// One ranked option on the score card.
#[derive(Debug, Clone)]
pub struct RouteOptionView {
    /// `*` for the selected option.
    pub marker: &'static str,
    pub rank: usize,
    pub label: &'static str,
    pub mode_id: &'static str,
    pub eco_score: String,
    pub rating: String,
    pub is_recommended: bool,
    pub distance: String,
    pub duration: String,
    pub co2: String,
    pub recommendations: Vec<String>,
}

impl RouteOptionView {
    pub fn from_option(
        rank: usize,
        option: &RouteOption,
        result: &PlanningResult,
        selected: Option<&RouteOption>,
    ) -> Self {
        let is_selected = selected.is_some_and(|s| s.mode == option.mode);
        let is_recommended = result
            .recommended_route
            .as_ref()
            .is_some_and(|r| r.mode == option.mode);

        Self {
            marker: if is_selected { "*" } else { " " },
            rank,
            label: option.mode.label(),
            mode_id: option.mode.as_str(),
            eco_score: format!("{:.1}", option.eco_analysis.eco_score),
            rating: option.eco_analysis.rating.clone(),
            is_recommended,
            distance: format_distance(option.route_details.distance_km),
            duration: format_duration(option.route_details.duration_min),
            co2: format_co2(option.estimated_emissions.total_co2_grams),
            recommendations: option.eco_analysis.recommendations.clone(),
        }
    }
}

/// One row of the quick comparison.
#[derive(Debug, Clone)]
pub struct ComparisonView {
    pub marker: &'static str,
    pub label: &'static str,
    pub mode_id: &'static str,
    pub eco_score: String,
    pub rating: String,
    pub distance: String,
    pub duration: String,
    pub co2: String,
    pub tip: String,
}

impl ComparisonView {
    pub fn from_comparison(row: &ModeComparison, is_best: bool) -> Self {
        Self {
            marker: if is_best { "*" } else { " " },
            label: row.mode.label(),
            mode_id: row.mode.as_str(),
            eco_score: format!("{:.1}", row.eco_score),
            rating: row.rating.clone(),
            distance: format_distance(row.distance_km),
            duration: format_duration(row.duration_min),
            co2: format_co2(row.co2_emissions),
            tip: row.top_recommendation.clone().unwrap_or_default(),
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn best_score(result: &PlanningResult) -> f64 {
    if result.summary.best_eco_score > 0.0 {
        return result.summary.best_eco_score;
    }
    result
        .route_options
        .iter()
        .map(|o| o.eco_analysis.eco_score)
        .fold(0.0, f64::max)
}

fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{km:.2} km")
    }
}

fn format_duration(minutes: f64) -> String {
    let total = minutes.round().max(0.0) as i64;
    let hours = total / 60;
    let mins = total % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

fn format_co2(grams: f64) -> String {
    if grams <= 0.0 {
        "no CO2".to_string()
    } else if grams >= 1000.0 {
        format!("{:.2} kg CO2", grams / 1000.0)
    } else {
        format!("{grams:.0} g CO2")
    }
}

/// OpenWeather air quality scale.
fn aqi_label(index: u8) -> &'static str {
    match index {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        _ => "Very Poor",
    }
}

fn conditions_line(weather: &Weather, air: &AirQuality) -> String {
    let mut parts = Vec::new();

    if let Some(temperature) = weather.temperature.as_deref().filter(|t| *t != "N/A") {
        parts.push(temperature.to_string());
    }
    if let Some(condition) = weather.condition.as_deref().filter(|c| !c.is_empty()) {
        parts.push(condition.to_lowercase());
    }
    if let Some(aqi) = air.air_quality_index {
        parts.push(format!("air quality {} ({aqi})", aqi_label(aqi)));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportMode;
    use crate::planning::SelectionEvent;

    const THREE_MODES: &str = include_str!("../tests/data/plan_three_modes.json");

    fn selection() -> SelectionState {
        let mut state = SelectionState::new();
        state.apply(SelectionEvent::ResultArrived(
            serde_json::from_str(THREE_MODES).unwrap(),
        ));
        state
    }

    #[test]
    fn card_lists_options_in_rank_order() {
        let card = score_card(&selection(), None).unwrap();

        let walking = card.find("1. Walking (foot-walking)").unwrap();
        let cycling = card.find("2. Bicycle (cycling-regular)").unwrap();
        let driving = card.find("3. Car (driving-car)").unwrap();
        assert!(walking < cycling && cycling < driving);

        assert!(card.contains("eco score 95.0 [Excellent] recommended"));
        assert!(card.contains("4.85 km, 11m, 582 g CO2"));
        assert!(card.contains("Selected: Walking"));
    }

    #[test]
    fn card_marks_manual_pick() {
        let mut state = selection();
        state.apply(SelectionEvent::Picked(TransportMode::DrivingCar));

        let card = score_card(&state, None).unwrap();

        assert!(card.contains("* 3. Car (driving-car)"));
        assert!(card.contains("  1. Walking (foot-walking)"));
        assert!(card.contains("Selected: Car"));
    }

    #[test]
    fn card_shows_conditions() {
        let card = score_card(&selection(), None).unwrap();
        assert!(card.contains("Conditions: 31.2 °C, scattered clouds, air quality Fair (2)"));
    }

    #[test]
    fn nothing_planned() {
        let card = score_card(&SelectionState::new(), None).unwrap();
        assert_eq!(card, "No route planned.\n");
    }

    #[test]
    fn comparison_marks_best() {
        let mut response = CompareResponse {
            route_comparison: vec![
                ModeComparison {
                    mode: TransportMode::FootWalking,
                    eco_score: 95.0,
                    rating: "Excellent".into(),
                    distance_km: 0.8,
                    duration_min: 9.6,
                    co2_emissions: 0.0,
                    top_recommendation: Some("Walking is the most eco-friendly option!".into()),
                },
                ModeComparison {
                    mode: TransportMode::DrivingCar,
                    eco_score: 32.0,
                    rating: "Poor".into(),
                    distance_km: 1.2,
                    duration_min: 3.0,
                    co2_emissions: 144.0,
                    top_recommendation: None,
                },
            ],
            best_option: None,
            environmental_summary: String::new(),
        };
        response.best_option = Some(response.route_comparison[0].clone());

        let text = ComparisonTemplate::from_response(&response).render().unwrap();

        assert!(text.contains("* Walking (foot-walking): eco score 95.0 [Excellent], 800 m, 10m, no CO2"));
        assert!(text.contains("  Car (driving-car): eco score 32.0 [Poor], 1.20 km, 3m, 144 g CO2"));
        assert!(text.contains("- Walking is the most eco-friendly option!"));
    }

    #[test]
    fn formatting() {
        assert_eq!(format_duration(43.4), "43m");
        assert_eq!(format_duration(125.0), "2h 5m");
        assert_eq!(format_distance(3.62), "3.62 km");
        assert_eq!(format_co2(1500.0), "1.50 kg CO2");
        assert_eq!(aqi_label(5), "Very Poor");
    }
}
