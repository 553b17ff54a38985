//! Session feedback state machine.
//!
//! ```text
//! Idle ──► Busy(message) ──► Success(message, tx) | Error(message)
//! ```
//!
//! State changes only through [`transition`]. Every flow invocation gets a
//! generation number; events carrying an older generation are dropped, so a
//! slow flow that was superseded cannot overwrite the feedback of the flow
//! that replaced it. A generation that reached a terminal state ignores any
//! further events.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::display::truncate_for_display;

pub const PROOF_READY_MESSAGE: &str = "Proof created, tokens transferring... Please wait.";

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Busy,
    Success,
    Error,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Registration,
    Transfer,
}

/// What the user sees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    pub message: String,
    pub tx_ref: Option<String>,
    /// Generation of the flow that owns this state; 0 before any flow.
    pub generation: u64,
    pub flow: Option<FlowKind>,
}

impl SessionState {
    pub fn display_message(&self) -> &str {
        truncate_for_display(&self.message)
    }

    pub fn display_tx_ref(&self) -> Option<&str> {
        self.tx_ref.as_deref().map(truncate_for_display)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A flow began; clears any previous feedback.
    FlowStarted { generation: u64, flow: FlowKind },
    /// Work in progress.
    Progress { generation: u64, message: String },
    /// The proof exists and the transfer request is going out.
    ProofReady { generation: u64 },
    /// The backend call settled.
    BackendResponded {
        generation: u64,
        outcome: BackendOutcome,
    },
    /// The flow stopped before or without a backend response.
    Failed { generation: u64, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendOutcome {
    Success { message: String, tx_ref: String },
    Error { message: String },
}

impl SessionEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SessionEvent::FlowStarted { generation, .. }
            | SessionEvent::Progress { generation, .. }
            | SessionEvent::ProofReady { generation }
            | SessionEvent::BackendResponded { generation, .. }
            | SessionEvent::Failed { generation, .. } => *generation,
        }
    }
}

/// Apply `event` to `state`.
pub fn transition(state: &SessionState, event: SessionEvent) -> SessionState {
    if let SessionEvent::FlowStarted { generation, flow } = event {
        if generation <= state.generation {
            return state.clone();
        }
        return SessionState {
            generation,
            flow: Some(flow),
            ..SessionState::default()
        };
    }

    if event.generation() != state.generation || state.phase.is_terminal() {
        return state.clone();
    }

    let mut next = state.clone();
    match event {
        SessionEvent::FlowStarted { .. } => unreachable!("handled above"),
        SessionEvent::Progress { message, .. } => {
            next.phase = Phase::Busy;
            next.message = message;
        }
        SessionEvent::ProofReady { .. } => {
            next.phase = Phase::Busy;
            next.message = PROOF_READY_MESSAGE.to_string();
        }
        SessionEvent::BackendResponded { outcome, .. } => match outcome {
            BackendOutcome::Success { message, tx_ref } => {
                next.phase = Phase::Success;
                next.message = message;
                next.tx_ref = Some(tx_ref);
            }
            BackendOutcome::Error { message } => {
                next.phase = Phase::Error;
                next.message = message;
                next.tx_ref = None;
            }
        },
        SessionEvent::Failed { message, .. } => {
            next.phase = Phase::Error;
            next.message = message;
            next.tx_ref = None;
        }
    }
    next
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle identifying one flow invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowTicket {
    pub generation: u64,
    pub flow: FlowKind,
}

/// Shared session feedback, observable through a watch channel.
pub struct Session {
    state: watch::Sender<SessionState>,
    next_generation: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state,
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Start a new flow, superseding whatever ran before.
    pub fn begin(&self, flow: FlowKind) -> FlowTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        self.apply(SessionEvent::FlowStarted { generation, flow });
        FlowTicket { generation, flow }
    }

    /// Feed an event through [`transition`]. Returns whether it changed the state.
    pub fn apply(&self, event: SessionEvent) -> bool {
        self.state.send_if_modified(|current| {
            let next = transition(current, event.clone());
            if next == *current {
                debug!(generation = event.generation(), current = current.generation, "session event ignored");
                false
            } else {
                *current = next;
                true
            }
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
