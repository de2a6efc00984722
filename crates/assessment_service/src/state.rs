//! Assessment run state machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CoreError;

/// Lifecycle state of one assessment run
///
/// ```text
/// Received -> Extracting -> Evaluating -> Scoring -> GraphUpdating -> RingDetecting -> Complete
///     \____________\______________\___________\____________\_______________\----> Failed
/// ```
///
/// Graph updating and ring detection execute concurrently with evaluation;
/// the trail records the order in which their results were merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Received,
    Extracting,
    Evaluating,
    Scoring,
    GraphUpdating,
    RingDetecting,
    Complete,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed)
    }

    pub fn can_transition_to(&self, target: RunState) -> bool {
        use RunState::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (*self, target),
            (Received, Extracting) |
            (Extracting, Evaluating) |
            (Evaluating, Scoring) |
            (Scoring, GraphUpdating) |
            (GraphUpdating, RingDetecting) |
            (RingDetecting, Complete) |
            (_, Failed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Received => "received",
            RunState::Extracting => "extracting",
            RunState::Evaluating => "evaluating",
            RunState::Scoring => "scoring",
            RunState::GraphUpdating => "graph_updating",
            RunState::RingDetecting => "ring_detecting",
            RunState::Complete => "complete",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A state entered by a run, with the time it was entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub state: RunState,
    pub at: DateTime<Utc>,
}

/// Ordered record of every state a run passed through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTrail {
    transitions: Vec<StateTransition>,
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTrail {
    /// Starts a trail in `Received`
    pub fn new() -> Self {
        Self {
            transitions: vec![StateTransition {
                state: RunState::Received,
                at: Utc::now(),
            }],
        }
    }

    pub fn current(&self) -> RunState {
        self.transitions
            .last()
            .map(|t| t.state)
            .unwrap_or(RunState::Received)
    }

    /// Moves the run to `target`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidStateTransition` if the move is not allowed.
    pub fn advance(&mut self, target: RunState) -> Result<(), CoreError> {
        let current = self.current();
        if !current.can_transition_to(target) {
            return Err(CoreError::invalid_state(format!(
                "cannot move assessment run from {} to {}",
                current, target
            )));
        }
        tracing::debug!(from = %current, to = %target, "Assessment run state transition");
        self.transitions.push(StateTransition {
            state: target,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Moves the run to `Failed` unless it has already terminated
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.transitions.push(StateTransition {
                state: RunState::Failed,
                at: Utc::now(),
            });
        }
    }

    pub fn states(&self) -> Vec<RunState> {
        self.transitions.iter().map(|t| t.state).collect()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}
