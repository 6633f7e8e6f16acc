//! Selected-route reconciliation.
//!
//! Two writers touch the selection: new planning results (which reset it to
//! the backend's recommendation) and the user (who may pick another option).
//! Both go through `SelectionState::apply`.

use tracing::{debug, warn};

use crate::domain::TransportMode;

use super::types::{PlanningResult, RouteOption};

/// Something that may change the selected route.
#[derive(Debug, Clone)]
pub enum SelectionEvent {
    /// A new planning result replaced the previous one.
    ResultArrived(PlanningResult),
    /// Planning failed or the session was reset.
    Cleared,
    /// The user picked the option for this mode.
    Picked(TransportMode),
}

/// The current planning result and which of its options is selected.
///
/// The selection is stored as a mode and resolved against the current
/// result, so it can never point into a superseded result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    result: Option<PlanningResult>,
    selected: Option<TransportMode>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event. Returns whether anything changed.
    pub fn apply(&mut self, event: SelectionEvent) -> bool {
        match event {
            SelectionEvent::ResultArrived(result) => {
                let recommended = result.recommended_route.as_ref().map(|r| r.mode);
                self.selected = recommended.filter(|&mode| result.route(mode).is_some());
                if recommended.is_some() && self.selected.is_none() {
                    warn!(?recommended, "recommended route missing from route options");
                }
                self.result = Some(result);
                true
            }
            SelectionEvent::Cleared => {
                let changed = self.result.is_some() || self.selected.is_some();
                self.result = None;
                self.selected = None;
                changed
            }
            SelectionEvent::Picked(mode) => {
                let available = self
                    .result
                    .as_ref()
                    .is_some_and(|result| result.route(mode).is_some());
                if !available {
                    warn!(%mode, "ignoring pick of a route not in the current result");
                    return false;
                }
                if self.selected == Some(mode) {
                    return false;
                }
                debug!(%mode, "route picked");
                self.selected = Some(mode);
                true
            }
        }
    }

    /// The current planning result.
    pub fn result(&self) -> Option<&PlanningResult> {
        self.result.as_ref()
    }

    /// Mode of the selected route.
    pub fn selected_mode(&self) -> Option<TransportMode> {
        self.selected
    }

    /// The selected route within the current result.
    pub fn selected_route(&self) -> Option<&RouteOption> {
        self.result.as_ref()?.route(self.selected?)
    }
}
