//! Generation strategy selection.
//!
//! Runs either the local assembler or a remote model and always resolves to
//! Markdown. A failed remote call degrades to the local document instead of
//! surfacing an empty result.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::document;
use crate::fields::{ProjectFields, ValidFields, ValidationError};
use crate::prompt;
use crate::remote::{GenerationError, TextGenerator};

/// Observable lifecycle of one generation request.
///
/// `Idle -> Validating -> {Rejected | Dispatching} -> {Succeeded | Degraded}`
///
/// `Idle` is only published before the first request. Later requests start
/// from the previous terminal state, which stays readable until the next
/// request moves to `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Validating,
    Rejected,
    Dispatching,
    Succeeded,
    Degraded,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Succeeded | Self::Degraded)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::Dispatching => "dispatching",
            Self::Succeeded => "succeeded",
            Self::Degraded => "degraded",
        }
    }
}

/// Which path produces the document.
#[derive(Clone, Copy)]
pub enum Strategy<'a> {
    /// Deterministic local assembly.
    Local,
    /// Prompt a remote model, falling back to local assembly on failure.
    Remote(&'a dyn TextGenerator),
}

impl Strategy<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote(_) => "remote",
        }
    }
}

/// Where successful content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local,
    Remote { model: String },
}

/// Outcome of a validated request. Always carries usable Markdown.
#[derive(Debug)]
pub enum Generation {
    Succeeded { content: String, source: Source },
    Degraded {
        error: GenerationError,
        fallback: String,
    },
}

impl Generation {
    pub fn markdown(&self) -> &str {
        match self {
            Self::Succeeded { content, .. } => content,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_markdown(self) -> String {
        match self {
            Self::Succeeded { content, .. } => content,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn state(&self) -> GenerationState {
        if self.is_degraded() {
            GenerationState::Degraded
        } else {
            GenerationState::Succeeded
        }
    }
}

/// A request the selector refused to run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejected {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("A generation is already in progress")]
    AlreadyRunning,
}

/// Clears the in-flight flag when a request finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Strategy selector. Holds no client and no per-request data, only the
/// in-flight flag and the published state.
pub struct Generator {
    state: watch::Sender<GenerationState>,
    in_flight: AtomicBool,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GenerationState::Idle);
        Self {
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> GenerationState {
        *self.state.borrow()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn transition(&self, next: GenerationState) {
        let prev = self.state.send_replace(next);
        debug!(from = prev.label(), to = next.label(), "generation_state");
    }

    fn begin(&self) -> Result<InFlight<'_>, Rejected> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| Rejected::AlreadyRunning)
    }

    /// Runs one generation request.
    ///
    /// Only a missing required field or an overlapping request is rejected;
    /// any remote failure resolves to [`Generation::Degraded`].
    pub async fn generate(
        &self,
        fields: &ProjectFields,
        strategy: Strategy<'_>,
    ) -> Result<Generation, Rejected> {
        let _guard = match self.begin() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(strategy = strategy.name(), "generation_already_running");
                return Err(e);
            }
        };

        self.transition(GenerationState::Validating);
        let valid = match fields.validate() {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "generation_rejected");
                self.transition(GenerationState::Rejected);
                return Err(e.into());
            }
        };

        info!(
            strategy = strategy.name(),
            project = valid.project_name(),
            "generation_start"
        );
        self.transition(GenerationState::Dispatching);

        let generation = match strategy {
            Strategy::Local => Generation::Succeeded {
                content: document::assemble_markdown(&valid),
                source: Source::Local,
            },
            Strategy::Remote(remote) => generate_remote(&valid, remote).await,
        };

        self.transition(generation.state());
        info!(
            strategy = strategy.name(),
            degraded = generation.is_degraded(),
            len = generation.markdown().len(),
            "generation_end"
        );
        Ok(generation)
    }
}

async fn generate_remote(valid: &ValidFields, remote: &dyn TextGenerator) -> Generation {
    let prompt = prompt::compile(valid);
    let reply = remote.generate(&prompt).await.and_then(|content| {
        if content.trim().is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(content)
        }
    });
    match reply {
        Ok(content) => Generation::Succeeded {
            content,
            source: Source::Remote {
                model: remote.model().to_string(),
            },
        },
        Err(error) => {
            warn!(model = remote.model(), error = %error, "generation_degraded");
            Generation::Degraded {
                fallback: document::assemble_markdown(valid),
                error,
            }
        }
    }
}
