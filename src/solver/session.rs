//! The incremental constraint session.
//!
//! A session accumulates real-valued arithmetic constraints across calls
//! until it is reset. A rejected constraint leaves the session exactly as it
//! was: the whole input is parsed and elaborated before anything changes.

use std::collections::{BTreeMap, HashMap};

use oxiz::{TermManager, solver::Solver};
use oxiz_core::TermId;
use serde::{Deserialize, Serialize};

use super::backend::{Verdict, encode_constraint, real_variable, render_value, solver_config};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::logic::Constraint;

/// Reply to an add-constraint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddConstraintResponse {
    /// Confirmation text.
    pub message: String,
    /// The constraint as submitted.
    pub constraint: String,
    /// Every constraint in the session, oldest first.
    pub constraints: Vec<String>,
}

/// Reply to a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// One of [`CheckResponse::SATISFIABLE`], [`CheckResponse::UNSATISFIABLE`]
    /// or [`CheckResponse::UNKNOWN`].
    pub message: String,
    /// Values of the variables the model assigns, when satisfiable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<BTreeMap<String, String>>,
    /// Every constraint in the session, oldest first.
    pub constraints: Vec<String>,
}

impl CheckResponse {
    /// Message for a satisfiable session.
    pub const SATISFIABLE: &'static str = "Satisfiable";
    /// Message for an unsatisfiable session.
    pub const UNSATISFIABLE: &'static str =
        "Unsatisfiable - no solution exists for the given constraints";
    /// Message when the solver cannot decide.
    pub const UNKNOWN: &'static str = "Unknown - the solver could not determine satisfiability";

    /// Whether the check found a model.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        self.message == Self::SATISFIABLE
    }
}

/// Reply to a reset request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Confirmation text.
    pub message: String,
}

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `"active"` once the session exists, `"inactive"` before first use.
    pub status: String,
    /// Number of accepted constraints.
    pub constraints_count: usize,
    /// Number of declared variables.
    pub variables_count: usize,
    /// Every constraint in the session, oldest first.
    pub constraints: Vec<String>,
}

struct SessionState {
    tm: TermManager,
    solver: Solver,
    variables: HashMap<String, TermId>,
    order: Vec<String>,
    constraints: Vec<String>,
}

impl SessionState {
    fn new(timeout_ms: u64) -> Self {
        Self {
            tm: TermManager::new(),
            solver: Solver::with_config(solver_config(timeout_ms)),
            variables: HashMap::new(),
            order: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

/// A long-lived solver context accumulating constraints over real variables.
///
/// Not thread-safe on its own; share it through a
/// [`SessionHandle`](super::SessionHandle).
pub struct IncrementalSession {
    config: SessionConfig,
    state: Option<SessionState>,
}

impl Default for IncrementalSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl IncrementalSession {
    /// Create a session. Solver state is allocated on first use.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Whether the session has been created.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Replace the solver, variables and constraint log with empty ones.
    pub fn reset(&mut self) -> ResetResponse {
        self.state = Some(SessionState::new(self.config.timeout_ms));
        tracing::info!("session reset");
        ResetResponse {
            message: "Solver context reset successfully".to_string(),
        }
    }

    /// Parse `constraint` (one or more comma-separated constraints) and add
    /// it to the session. New identifiers become real variables.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyConstraint`] for blank input and
    /// [`SessionError::Malformed`] if parsing fails. In both cases the
    /// session is unchanged.
    pub fn add_constraint(
        &mut self,
        constraint: &str,
    ) -> Result<AddConstraintResponse, SessionError> {
        if constraint.trim().is_empty() {
            return Err(SessionError::EmptyConstraint);
        }
        let parsed = Constraint::parse_list(constraint).map_err(|e| {
            tracing::debug!(constraint, error = %e, "constraint rejected");
            SessionError::Malformed(e.to_string())
        })?;

        let timeout_ms = self.config.timeout_ms;
        let state = self
            .state
            .get_or_insert_with(|| SessionState::new(timeout_ms));
        // New variables become visible only once every assert went through.
        let mut scope = state.variables.clone();
        let mut declared = Vec::new();
        for item in &parsed {
            for name in item.variables() {
                if !scope.contains_key(&name) {
                    let id = real_variable(&mut state.tm, &name);
                    scope.insert(name.clone(), id);
                    declared.push(name);
                }
            }
        }
        for item in &parsed {
            let term = encode_constraint(&mut state.tm, &scope, item);
            state.solver.assert(term, &mut state.tm);
        }
        state.variables = scope;
        state.order.extend(declared);
        state.constraints.push(constraint.to_string());
        tracing::debug!(
            constraint,
            total = state.constraints.len(),
            "constraint added"
        );

        Ok(AddConstraintResponse {
            message: "Constraint added".to_string(),
            constraint: constraint.to_string(),
            constraints: state.constraints.clone(),
        })
    }

    /// Check the accumulated constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Inactive`] if nothing has created the
    /// session yet.
    pub fn check_satisfiability(&mut self) -> Result<CheckResponse, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::Inactive)?;
        let verdict = Verdict::from(state.solver.check(&mut state.tm));
        tracing::debug!(?verdict, constraints = state.constraints.len(), "session checked");

        let (message, model) = match verdict {
            Verdict::Sat => {
                let mut assignments = BTreeMap::new();
                if let Some(model) = state.solver.model() {
                    for name in &state.order {
                        let Some(&id) = state.variables.get(name) else {
                            continue;
                        };
                        if let Some(value) = model.get(id)
                            && let Some(rendered) = render_value(&state.tm, value)
                        {
                            assignments.insert(name.clone(), rendered);
                        }
                    }
                }
                (CheckResponse::SATISFIABLE, Some(assignments))
            }
            Verdict::Unsat => (CheckResponse::UNSATISFIABLE, None),
            Verdict::Unknown => (CheckResponse::UNKNOWN, None),
        };

        Ok(CheckResponse {
            message: message.to_string(),
            model,
            constraints: state.constraints.clone(),
        })
    }

    /// A marker for [`IncrementalSession::restore`]: the number of accepted
    /// constraints, or `None` while inactive.
    #[must_use]
    pub fn checkpoint(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.constraints.len())
    }

    /// Rebuild the solver context as it was at `checkpoint`, replaying the
    /// constraints accepted up to that point.
    ///
    /// Used after a request was abandoned halfway through, when the solver
    /// may hold a partial assertion.
    pub fn restore(&mut self, checkpoint: Option<usize>) {
        let mut log = self
            .state
            .take()
            .map(|state| state.constraints)
            .unwrap_or_default();
        let Some(accepted) = checkpoint else {
            return;
        };
        log.truncate(accepted);
        self.state = Some(SessionState::new(self.config.timeout_ms));
        for constraint in &log {
            if let Err(e) = self.add_constraint(constraint) {
                tracing::warn!(
                    constraint = constraint.as_str(),
                    error = %e,
                    "constraint dropped while restoring session"
                );
            }
        }
        tracing::info!(constraints = log.len(), "session restored");
    }

    /// Counts and the constraint log.
    #[must_use]
    pub fn status(&self) -> StatusResponse {
        match &self.state {
            Some(state) => StatusResponse {
                status: "active".to_string(),
                constraints_count: state.constraints.len(),
                variables_count: state.variables.len(),
                constraints: state.constraints.clone(),
            },
            None => StatusResponse {
                status: "inactive".to_string(),
                constraints_count: 0,
                variables_count: 0,
                constraints: Vec::new(),
            },
        }
    }
}
