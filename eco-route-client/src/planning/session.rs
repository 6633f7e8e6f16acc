//! Route planning session.
//!
//! Holds the outcome of the most recent planning call: the result and its
//! selected route, or a message explaining why planning failed. Calls may
//! overlap; only the newest one is allowed to land.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::TransportMode;

use super::error::PlanningError;
use super::request::PlanRequest;
use super::selection::{SelectionEvent, SelectionState};
use super::types::PlanningResult;

/// Trait for answering planning requests.
///
/// This abstraction allows the session to be tested without a backend.
#[async_trait]
pub trait PlanningBackend: Send + Sync {
    async fn plan(&self, request: &PlanRequest) -> Result<PlanningResult, PlanningError>;
}

/// What happened to a `plan` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The result was stored and the recommended route selected.
    Applied,
    /// Planning failed; the message is now the session's error.
    Failed(String),
    /// A newer call was issued before this one finished; nothing changed.
    Superseded,
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub selection: SelectionState,
    pub error: Option<String>,
    pub is_loading: bool,
    pub planned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct SessionState {
    selection: SelectionState,
    error: Option<String>,
    is_loading: bool,
    planned_at: Option<DateTime<Utc>>,
    last_request: Option<PlanRequest>,
    /// Sequence number of the newest call; completions of older calls are dropped.
    latest_call: u64,
}

/// Planning session for one form.
pub struct RoutePlanningSession<B> {
    backend: B,
    state: RwLock<SessionState>,
}

impl<B: PlanningBackend> RoutePlanningSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Access the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Plan a route, superseding any call still in flight.
    pub async fn plan(&self, request: PlanRequest) -> PlanOutcome {
        let call = {
            let mut state = self.state.write().await;
            state.latest_call += 1;
            state.last_request = Some(request.clone());
            state.is_loading = true;
            state.error = None;
            state.latest_call
        };

        debug!(call, modes = %request.modes().query_value(), "planning route");
        let response = self.backend.plan(&request).await;

        let mut state = self.state.write().await;
        if state.latest_call != call {
            debug!(call, latest = state.latest_call, "discarding superseded planning response");
            return PlanOutcome::Superseded;
        }

        state.is_loading = false;

        match response {
            Ok(result) => {
                info!(
                    call,
                    options = result.route_options.len(),
                    recommended = ?result.recommended_route.as_ref().map(|r| r.mode),
                    "planning result applied"
                );
                state.selection.apply(SelectionEvent::ResultArrived(result));
                state.planned_at = Some(Utc::now());
                PlanOutcome::Applied
            }
            Err(e) => {
                warn!(call, error = %e, "planning failed");
                let message = e.user_message();
                state.selection.apply(SelectionEvent::Cleared);
                state.error = Some(message.clone());
                PlanOutcome::Failed(message)
            }
        }
    }

    /// Re-issue the last request with the same inputs.
    ///
    /// Returns `None` if nothing has been planned yet.
    pub async fn retry(&self) -> Option<PlanOutcome> {
        let request = self.state.read().await.last_request.clone()?;
        Some(self.plan(request).await)
    }

    /// The user picked another route. Returns whether the selection changed.
    pub async fn select_route(&self, mode: TransportMode) -> bool {
        let mut state = self.state.write().await;
        state.selection.apply(SelectionEvent::Picked(mode))
    }

    /// Hide the current error message.
    pub async fn dismiss_error(&self) {
        self.state.write().await.error = None;
    }

    /// Forget everything, including any call still in flight.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let latest_call = state.latest_call + 1;
        *state = SessionState {
            latest_call,
            ..SessionState::default()
        };
    }

    /// Current state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            selection: state.selection.clone(),
            error: state.error.clone(),
            is_loading: state.is_loading,
            planned_at: state.planned_at,
        }
    }

    /// The last request issued, for display or retry.
    pub async fn last_request(&self) -> Option<PlanRequest> {
        self.state.read().await.last_request.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, ModeSet};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    const THREE_MODES: &str = include_str!("../../tests/data/plan_three_modes.json");
    const CYCLING: &str = include_str!("../../tests/data/plan_cycling.json");

    type Reply = Result<PlanningResult, PlanningError>;

    /// Backend whose answers are released by the test, in any order.
    #[derive(Default)]
    struct GatedBackend {
        gates: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        requests: Mutex<Vec<PlanRequest>>,
    }

    impl GatedBackend {
        fn gate(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PlanningBackend for Arc<GatedBackend> {
        async fn plan(&self, request: &PlanRequest) -> Reply {
            self.requests.lock().unwrap().push(request.clone());
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(gate) => gate.await.unwrap_or(Err(PlanningError::Timeout)),
                None => Err(PlanningError::Timeout),
            }
        }
    }

    fn request(modes: &[TransportMode]) -> PlanRequest {
        PlanRequest::new(
            Some(Location::new(13.0827, 80.2707).unwrap()),
            Some(Location::new(13.0674, 80.2430).unwrap()),
            modes.iter().copied().collect::<ModeSet>(),
        )
        .unwrap()
    }

    fn three_modes() -> PlanningResult {
        serde_json::from_str(THREE_MODES).unwrap()
    }

    fn cycling() -> PlanningResult {
        serde_json::from_str(CYCLING).unwrap()
    }

    fn no_route() -> PlanningError {
        PlanningError::from_response(500, r#"{"detail":"no route found"}"#)
    }

    #[tokio::test]
    async fn success_selects_recommended() {
        let backend = Arc::new(GatedBackend::default());
        backend.gate().send(Ok(cycling())).unwrap();
        let session = RoutePlanningSession::new(Arc::clone(&backend));

        let outcome = session.plan(request(&[TransportMode::CyclingRegular])).await;

        assert_eq!(outcome, PlanOutcome::Applied);
        let snapshot = session.snapshot().await;
        let selected = snapshot.selection.selected_route().unwrap();
        assert_eq!(selected.mode, TransportMode::CyclingRegular);
        assert_eq!(snapshot.selection.result().unwrap().route_options.len(), 1);
        assert!(!snapshot.is_loading);
        assert!(snapshot.planned_at.is_some());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn failure_clears_result_and_selection() {
        let backend = Arc::new(GatedBackend::default());
        backend.gate().send(Ok(three_modes())).unwrap();
        backend.gate().send(Err(no_route())).unwrap();
        let session = RoutePlanningSession::new(Arc::clone(&backend));

        session.plan(request(&TransportMode::ALL)).await;
        let outcome = session.plan(request(&TransportMode::ALL)).await;

        assert_eq!(outcome, PlanOutcome::Failed("no route found".into()));
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.error.as_deref(), Some("no route found"));
        assert!(snapshot.selection.result().is_none());
        assert!(snapshot.selection.selected_route().is_none());
    }

    #[tokio::test]
    async fn manual_pick_survives_until_next_plan() {
        let backend = Arc::new(GatedBackend::default());
        backend.gate().send(Ok(three_modes())).unwrap();
        backend.gate().send(Ok(three_modes())).unwrap();
        let session = RoutePlanningSession::new(Arc::clone(&backend));
        let options = three_modes().route_options;

        session.plan(request(&TransportMode::ALL)).await;
        assert_eq!(
            session.snapshot().await.selection.selected_route(),
            Some(&options[0])
        );

        assert!(session.select_route(TransportMode::DrivingCar).await);
        assert_eq!(
            session.snapshot().await.selection.selected_route(),
            Some(&options[2])
        );

        session.plan(request(&TransportMode::ALL)).await;
        assert_eq!(
            session.snapshot().await.selection.selected_route(),
            Some(&options[0])
        );
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let backend = Arc::new(GatedBackend::default());
        let first_gate = backend.gate();
        let second_gate = backend.gate();
        let session = Arc::new(RoutePlanningSession::new(Arc::clone(&backend)));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.plan(request(&TransportMode::ALL)).await }
        });
        while backend.request_count() < 1 {
            tokio::task::yield_now().await;
        }

        let second = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.plan(request(&[TransportMode::CyclingRegular])).await }
        });
        while backend.request_count() < 2 {
            tokio::task::yield_now().await;
        }

        // Newest answers first, then the stale one lands
        second_gate.send(Ok(cycling())).unwrap();
        assert_eq!(second.await.unwrap(), PlanOutcome::Applied);
        first_gate.send(Ok(three_modes())).unwrap();
        assert_eq!(first.await.unwrap(), PlanOutcome::Superseded);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.selection.result(), Some(&cycling()));
        assert_eq!(
            snapshot.selection.selected_mode(),
            Some(TransportMode::CyclingRegular)
        );
    }

    #[tokio::test]
    async fn stale_failure_does_not_clobber_result() {
        let backend = Arc::new(GatedBackend::default());
        let first_gate = backend.gate();
        let second_gate = backend.gate();
        let session = Arc::new(RoutePlanningSession::new(Arc::clone(&backend)));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.plan(request(&TransportMode::ALL)).await }
        });
        while backend.request_count() < 1 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.plan(request(&TransportMode::ALL)).await }
        });
        while backend.request_count() < 2 {
            tokio::task::yield_now().await;
        }

        second_gate.send(Ok(three_modes())).unwrap();
        second.await.unwrap();
        first_gate.send(Err(no_route())).unwrap();
        assert_eq!(first.await.unwrap(), PlanOutcome::Superseded);

        let snapshot = session.snapshot().await;
        assert!(snapshot.error.is_none());
        assert!(snapshot.selection.result().is_some());
    }

    #[tokio::test]
    async fn retry_reuses_last_inputs() {
        let backend = Arc::new(GatedBackend::default());
        backend.gate().send(Err(no_route())).unwrap();
        backend.gate().send(Ok(cycling())).unwrap();
        let session = RoutePlanningSession::new(Arc::clone(&backend));

        assert!(session.retry().await.is_none());

        let original = request(&[TransportMode::CyclingRegular]);
        session.plan(original.clone()).await;
        let outcome = session.retry().await;

        assert_eq!(outcome, Some(PlanOutcome::Applied));
        let requests = backend.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![original.clone(), original]);
    }

    #[tokio::test]
    async fn dismiss_error_keeps_cleared_result() {
        let backend = Arc::new(GatedBackend::default());
        backend.gate().send(Err(PlanningError::Timeout)).unwrap();
        let session = RoutePlanningSession::new(Arc::clone(&backend));

        let outcome = session.plan(request(&TransportMode::ALL)).await;
        assert_eq!(
            outcome,
            PlanOutcome::Failed(crate::planning::FALLBACK_MESSAGE.into())
        );

        session.dismiss_error().await;
        let snapshot = session.snapshot().await;
        assert!(snapshot.error.is_none());
        assert!(snapshot.selection.result().is_none());
    }

    #[tokio::test]
    async fn reset_discards_in_flight_call() {
        let backend = Arc::new(GatedBackend::default());
        let gate = backend.gate();
        let session = Arc::new(RoutePlanningSession::new(Arc::clone(&backend)));

        let pending = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.plan(request(&TransportMode::ALL)).await }
        });
        while backend.request_count() < 1 {
            tokio::task::yield_now().await;
        }

        session.reset().await;
        gate.send(Ok(three_modes())).unwrap();

        assert_eq!(pending.await.unwrap(), PlanOutcome::Superseded);
        assert_eq!(session.snapshot().await, SessionSnapshot::default());
        assert!(session.last_request().await.is_none());
    }
}
