//! Per-field search state machine.
//!
//! `FieldMachine` is synchronous and owns no timers or tasks. Each event
//! returns the effects the owner must carry out (start a debounce timer,
//! run a search, publish a location). Debounce tickets and query equality
//! make late timers and late search results inert.

use tracing::{debug, warn};

use crate::domain::Location;
use crate::geocode::{GeocodeResult, QueryKind, SearchOutcome, classify_query};

/// Where a field is in its search lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending.
    Idle,
    /// Waiting for typing to pause.
    Debouncing,
    /// A search for the current query is outstanding.
    Searching,
    /// Suggestions are available.
    ResultsShown,
    /// A location was chosen or typed as coordinates.
    Resolved,
    /// The last search found nothing.
    Empty,
}

/// Search state of one location field.
///
/// `results_visible` implies `results` is non-empty, and `is_searching` is
/// only set while a search for the current `query` is outstanding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<GeocodeResult>,
    pub is_searching: bool,
    pub results_visible: bool,
}

/// Work requested by the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start (or restart) the debounce timer for this ticket.
    StartDebounce(u64),
    /// Search for this query.
    Search(String),
    /// Publish the field's location upward.
    Emit(Option<Location>),
}

/// Everything an observer of the field needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub search: SearchState,
    pub phase: Phase,
    pub location: Option<Location>,
}

/// State machine for one location input.
#[derive(Debug, Clone)]
pub struct FieldMachine {
    state: SearchState,
    phase: Phase,
    location: Option<Location>,
    /// Bumped by every event that makes pending debounce work obsolete.
    ticket: u64,
    min_query_chars: usize,
}

impl FieldMachine {
    /// Create an idle field.
    pub fn new(min_query_chars: usize) -> Self {
        Self {
            state: SearchState::default(),
            phase: Phase::Idle,
            location: None,
            ticket: 0,
            min_query_chars,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            search: self.state.clone(),
            phase: self.phase,
            location: self.location.clone(),
        }
    }

    /// The user typed; `text` is the whole field content.
    pub fn input(&mut self, text: impl Into<String>) -> Vec<Effect> {
        self.ticket += 1;
        self.state.query = text.into();
        self.state.is_searching = false;

        if self.state.query.trim().is_empty() {
            self.close_results();
            self.phase = Phase::Idle;
            if self.location.is_some() {
                return self.emit(None);
            }
            return Vec::new();
        }

        if classify_query(&self.state.query, self.min_query_chars) == QueryKind::TooShort {
            self.close_results();
            self.phase = Phase::Idle;
            return Vec::new();
        }

        self.phase = Phase::Debouncing;
        vec![Effect::StartDebounce(self.ticket)]
    }

    /// The debounce timer for `ticket` fired.
    pub fn debounce_elapsed(&mut self, ticket: u64) -> Vec<Effect> {
        if ticket != self.ticket || self.phase != Phase::Debouncing {
            debug!(ticket, current = self.ticket, "ignoring superseded debounce timer");
            return Vec::new();
        }

        match classify_query(&self.state.query, self.min_query_chars) {
            QueryKind::TooShort => {
                self.close_results();
                self.phase = Phase::Idle;
                Vec::new()
            }
            QueryKind::Coordinates(location) => self.resolve_coordinates(location),
            QueryKind::Text => {
                self.state.is_searching = true;
                self.phase = Phase::Searching;
                vec![Effect::Search(self.state.query.clone())]
            }
        }
    }

    /// A search issued for `query` finished.
    ///
    /// Returns the effects of applying it; a completion for anything other
    /// than the outstanding search of the current query is discarded.
    pub fn search_completed(&mut self, query: &str, outcome: SearchOutcome) -> Vec<Effect> {
        if query != self.state.query || !self.state.is_searching {
            debug!(query, current = %self.state.query, "discarding stale search results");
            return Vec::new();
        }

        self.state.is_searching = false;

        match outcome {
            SearchOutcome::Coordinates(location) => self.resolve_coordinates(location),
            SearchOutcome::Skipped => {
                self.close_results();
                self.phase = Phase::Idle;
                Vec::new()
            }
            SearchOutcome::Suggestions(results) => {
                self.state.results_visible = !results.is_empty();
                self.state.results = results;
                self.phase = if self.state.results_visible {
                    Phase::ResultsShown
                } else {
                    Phase::Empty
                };
                Vec::new()
            }
        }
    }

    /// The user picked suggestion `index`.
    pub fn select(&mut self, index: usize) -> Vec<Effect> {
        let Some(result) = self.state.results.get(index) else {
            warn!(index, available = self.state.results.len(), "no such suggestion");
            return Vec::new();
        };

        let location = match result.to_location() {
            Ok(location) => location,
            Err(e) => {
                warn!(name = %result.display_name, error = %e, "suggestion has unusable coordinates");
                return Vec::new();
            }
        };

        self.ticket += 1;
        self.state.query = result.display_name.clone();
        self.state.is_searching = false;
        self.state.results_visible = false;
        self.phase = Phase::Resolved;
        self.emit(Some(location))
    }

    /// The user cleared the field.
    pub fn clear(&mut self) -> Vec<Effect> {
        self.ticket += 1;
        self.state.query.clear();
        self.state.is_searching = false;
        self.close_results();
        self.phase = Phase::Idle;
        self.emit(None)
    }

    /// The owner replaced the location programmatically.
    ///
    /// The field text follows the new value; nothing is searched and nothing
    /// is emitted back upward.
    pub fn sync_external(&mut self, location: Option<Location>) {
        self.ticket += 1;
        self.state.query = location
            .as_ref()
            .map(Location::display_text)
            .unwrap_or_default();
        self.state.is_searching = false;
        self.close_results();
        self.phase = if location.is_some() {
            Phase::Resolved
        } else {
            Phase::Idle
        };
        self.location = location;
    }

    /// Interaction outside the field: hide the dropdown, keep everything else.
    pub fn dismiss(&mut self) {
        self.state.results_visible = false;
    }

    fn resolve_coordinates(&mut self, location: Location) -> Vec<Effect> {
        self.state.is_searching = false;
        self.close_results();
        self.phase = Phase::Resolved;
        self.emit(Some(location))
    }

    fn close_results(&mut self) {
        self.state.results.clear();
        self.state.results_visible = false;
    }

    fn emit(&mut self, location: Option<Location>) -> Vec<Effect> {
        self.location = location.clone();
        vec![Effect::Emit(location)]
    }
}
