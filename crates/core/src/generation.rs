//! Cache generation lifecycle.
//!
//! Each deployed version moves through
//! `installing -> installed | failed`, `installed -> active`, `active -> superseded`.
//! `failed` and `superseded` are terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Lifecycle state of one cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Installing,
    Installed,
    Failed,
    Active,
    Superseded,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationState::Installing => "installing",
            GenerationState::Installed => "installed",
            GenerationState::Failed => "failed",
            GenerationState::Active => "active",
            GenerationState::Superseded => "superseded",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: GenerationState) -> bool {
        use GenerationState::*;
        matches!(
            (self, next),
            (Installing, Installed) | (Installing, Failed) | (Installed, Active) | (Active, Superseded)
        )
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deployed cache generation and where it is in its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Generation {
    /// Cache name / version tag, e.g. `expense-tracker-v1`.
    pub name: String,
    pub state: GenerationState,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
}

impl Generation {
    /// A generation that has just started installing.
    pub fn installing(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { name: name.into(), state: GenerationState::Installing, created_at: now, changed_at: now }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` and leaves the state unchanged.
    pub fn advance(&mut self, next: GenerationState) -> Result<(), Error> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                generation: self.name.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }

        tracing::info!(generation = %self.name, from = %self.state, to = %next, "generation state change");
        self.state = next;
        self.changed_at = Utc::now();
        Ok(())
    }
}
