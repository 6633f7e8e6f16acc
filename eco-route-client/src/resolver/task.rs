//! Owner task for a location field.
//!
//! Every event for a field (user commands, timer fires, search completions)
//! is handled to completion by a single task, one at a time, so the field's
//! state has exactly one writer.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::Location;
use crate::geocode::{GeocodeSearch, Geocoder, SearchOutcome};

use super::machine::{Effect, FieldMachine, FieldSnapshot};

/// Default pause in typing before a search starts.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Configuration for a location field.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How long typing must pause before searching.
    pub debounce: Duration,
}

impl ResolverConfig {
    /// Set the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Returned when the field's task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("location resolver has shut down")]
pub struct ResolverClosed;

/// Commands from the UI.
#[derive(Debug)]
enum Command {
    Input(String),
    Select(usize),
    Clear,
    SetLocation(Option<Location>),
    Dismiss,
}

/// Completions of work the task started itself.
#[derive(Debug)]
enum Internal {
    DebounceElapsed(u64),
    SearchFinished {
        query: String,
        outcome: SearchOutcome,
    },
}

/// Debounced, staleness-checked address search for one input field.
pub struct LocationResolver<G> {
    machine: FieldMachine,
    search: GeocodeSearch<G>,
    debounce: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    snapshots: watch::Sender<FieldSnapshot>,
    locations: watch::Sender<Option<Location>>,
    pending_debounce: Option<JoinHandle<()>>,
}

impl<G: Geocoder + 'static> LocationResolver<G> {
    /// Spawn the field's task on the current tokio runtime.
    ///
    /// The task runs until every `ResolverHandle` has been dropped.
    pub fn spawn(search: GeocodeSearch<G>, config: ResolverConfig) -> ResolverHandle {
        let machine = FieldMachine::new(search.min_query_chars());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(machine.snapshot());
        let (locations, locations_rx) = watch::channel(None);

        let resolver = Self {
            machine,
            search,
            debounce: config.debounce,
            commands: commands_rx,
            internal_tx,
            internal_rx,
            snapshots,
            locations,
            pending_debounce: None,
        };
        tokio::spawn(resolver.run());

        ResolverHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            locations: locations_rx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.internal_rx.recv() => self.handle_internal(event),
            }
        }

        self.cancel_debounce();
        debug!("location resolver stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let effects = match command {
            Command::Input(text) => {
                self.cancel_debounce();
                self.machine.input(text)
            }
            Command::Select(index) => {
                let effects = self.machine.select(index);
                if !effects.is_empty() {
                    self.cancel_debounce();
                }
                effects
            }
            Command::Clear => {
                self.cancel_debounce();
                self.machine.clear()
            }
            Command::SetLocation(location) => {
                self.cancel_debounce();
                self.machine.sync_external(location.clone());
                // Upstream already knows the value; keep the location feed in step
                // without treating it as a new emission.
                self.locations.send_if_modified(|current| {
                    let changed = *current != location;
                    *current = location;
                    changed
                });
                Vec::new()
            }
            Command::Dismiss => {
                self.machine.dismiss();
                Vec::new()
            }
        };

        self.execute(effects);
    }

    fn handle_internal(&mut self, event: Internal) {
        let effects = match event {
            Internal::DebounceElapsed(ticket) => {
                self.pending_debounce = None;
                self.machine.debounce_elapsed(ticket)
            }
            Internal::SearchFinished { query, outcome } => {
                self.machine.search_completed(&query, outcome)
            }
        };

        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartDebounce(ticket) => {
                    self.cancel_debounce();
                    let tx = self.internal_tx.clone();
                    let delay = self.debounce;
                    self.pending_debounce = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Internal::DebounceElapsed(ticket));
                    }));
                }
                Effect::Search(query) => {
                    debug!(%query, "searching");
                    let search = self.search.clone();
                    let tx = self.internal_tx.clone();
                    tokio::spawn(async move {
                        let outcome = search.search(&query).await;
                        // The field may be gone by now; nothing to report to.
                        let _ = tx.send(Internal::SearchFinished { query, outcome });
                    });
                }
                Effect::Emit(location) => {
                    debug!(location = ?location, "field location changed");
                    self.locations.send_replace(location);
                }
            }
        }

        self.snapshots.send_replace(self.machine.snapshot());
    }

    fn cancel_debounce(&mut self) {
        if let Some(pending) = self.pending_debounce.take() {
            pending.abort();
        }
    }
}

/// Cloneable handle to a running `LocationResolver`.
#[derive(Debug, Clone)]
pub struct ResolverHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<FieldSnapshot>,
    locations: watch::Receiver<Option<Location>>,
}

impl ResolverHandle {
    /// The field text changed.
    pub fn input(&self, text: impl Into<String>) -> Result<(), ResolverClosed> {
        self.send(Command::Input(text.into()))
    }

    /// Pick suggestion `index` from the current results.
    pub fn select(&self, index: usize) -> Result<(), ResolverClosed> {
        self.send(Command::Select(index))
    }

    /// Clear the field.
    pub fn clear(&self) -> Result<(), ResolverClosed> {
        self.send(Command::Clear)
    }

    /// Replace the location from outside (e.g. a form reset).
    pub fn set_location(&self, location: Option<Location>) -> Result<(), ResolverClosed> {
        self.send(Command::SetLocation(location))
    }

    /// Close the suggestion dropdown.
    pub fn dismiss(&self) -> Result<(), ResolverClosed> {
        self.send(Command::Dismiss)
    }

    /// Latest published field state.
    pub fn snapshot(&self) -> FieldSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Latest resolved location.
    pub fn location(&self) -> Option<Location> {
        self.locations.borrow().clone()
    }

    /// Watch every field state change.
    pub fn subscribe(&self) -> watch::Receiver<FieldSnapshot> {
        self.snapshots.clone()
    }

    /// Watch only location changes.
    pub fn location_changes(&self) -> watch::Receiver<Option<Location>> {
        self.locations.clone()
    }

    fn send(&self, command: Command) -> Result<(), ResolverClosed> {
        self.commands.send(command).map_err(|_| ResolverClosed)
    }
}
