//! The planning form: two location fields, mode toggles, and a session.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{ModeSet, TransportMode};
use crate::planning::{
    PlanOutcome, PlanRequest, PlanningBackend, RoutePlanningSession, ValidationError,
};
use crate::resolver::{ResolverClosed, ResolverHandle};

/// Form state and the plan action.
///
/// Validation happens here, before anything reaches the session, so a
/// form with a missing location or no modes never makes a request.
pub struct PlannerForm<B> {
    start: ResolverHandle,
    end: ResolverHandle,
    modes: ModeSet,
    session: Arc<RoutePlanningSession<B>>,
    validation: Option<ValidationError>,
}

impl<B: PlanningBackend> PlannerForm<B> {
    /// Create a form with every mode selected.
    pub fn new(
        start: ResolverHandle,
        end: ResolverHandle,
        session: Arc<RoutePlanningSession<B>>,
    ) -> Self {
        Self {
            start,
            end,
            modes: ModeSet::all(),
            session,
            validation: None,
        }
    }

    pub fn start(&self) -> &ResolverHandle {
        &self.start
    }

    pub fn end(&self) -> &ResolverHandle {
        &self.end
    }

    pub fn session(&self) -> &Arc<RoutePlanningSession<B>> {
        &self.session
    }

    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    /// Flip a mode toggle. Returns whether it is selected afterwards.
    pub fn toggle_mode(&mut self, mode: TransportMode) -> bool {
        self.modes.toggle(mode)
    }

    /// Replace the whole mode selection.
    pub fn set_modes(&mut self, modes: ModeSet) {
        self.modes = modes;
    }

    /// The plan action is disabled while no mode is selected.
    pub fn can_submit(&self) -> bool {
        !self.modes.is_empty()
    }

    /// Inline message from the last rejected submit.
    pub fn validation_message(&self) -> Option<String> {
        self.validation.map(|e| e.to_string())
    }

    /// Validate the form and plan.
    ///
    /// On a validation error nothing is sent and the message is kept for
    /// display until the next submit.
    pub async fn submit(&mut self) -> Result<PlanOutcome, ValidationError> {
        let request = PlanRequest::new(
            self.start.location(),
            self.end.location(),
            self.modes.clone(),
        );

        let request = match request {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "plan rejected before dispatch");
                self.validation = Some(e);
                return Err(e);
            }
        };

        self.validation = None;
        Ok(self.session.plan(request).await)
    }

    /// Clear both fields and the session.
    pub async fn reset(&mut self) -> Result<(), ResolverClosed> {
        self.start.set_location(None)?;
        self.end.set_location(None)?;
        self.validation = None;
        self.session.reset().await;
        Ok(())
    }
}
