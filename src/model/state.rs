//! Extraction state machine
//!
//! `Idle --submit--> Loading --(response)--> Success | Error`, and any state
//! returns to `Idle` when a new file is selected. `transition` is pure so the
//! machine can be tested without a renderer or a network.

use crate::error::ExtractionError;
use crate::model::result::ExtractionResult;
use std::fmt;
use std::sync::Arc;

/// Identifier of an accepted submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExtractionState {
    #[default]
    Idle,
    Loading {
        request: RequestId,
    },
    Success(Arc<ExtractionResult>),
    Error(ExtractionError),
}

impl ExtractionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ExtractionState::Loading { .. })
    }

    pub fn result(&self) -> Option<&Arc<ExtractionResult>> {
        match self {
            ExtractionState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExtractionError> {
        match self {
            ExtractionState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtractionState::Idle => "Idle",
            ExtractionState::Loading { .. } => "Extracting",
            ExtractionState::Success(_) => "Done",
            ExtractionState::Error(_) => "Failed",
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum ExtractionEvent {
    /// A submit was accepted and assigned `request`
    Submitted(RequestId),
    /// The response for `request` arrived
    Completed {
        request: RequestId,
        outcome: Result<ExtractionResult, ExtractionError>,
    },
    /// The deadline for `request` elapsed
    TimedOut { request: RequestId, after_secs: u64 },
    /// A new source file replaced the previous one
    FileSelected,
}

/// Apply `event` to `state`
///
/// Events that do not fit the current state leave it unchanged: a submit
/// while loading, or a completion for any request other than the one being
/// waited on.
pub fn transition(state: ExtractionState, event: ExtractionEvent) -> ExtractionState {
    match (state, event) {
        (_, ExtractionEvent::FileSelected) => ExtractionState::Idle,

        (state @ ExtractionState::Loading { .. }, ExtractionEvent::Submitted(_)) => state,
        (_, ExtractionEvent::Submitted(request)) => ExtractionState::Loading { request },

        (ExtractionState::Loading { request }, ExtractionEvent::Completed { request: done, outcome })
            if request == done =>
        {
            match outcome {
                Ok(result) => ExtractionState::Success(Arc::new(result)),
                Err(err) => ExtractionState::Error(err),
            }
        }

        (ExtractionState::Loading { request }, ExtractionEvent::TimedOut { request: late, after_secs })
            if request == late =>
        {
            ExtractionState::Error(ExtractionError::Timeout(after_secs))
        }

        (state, ExtractionEvent::Completed { .. } | ExtractionEvent::TimedOut { .. }) => state,
    }
}
