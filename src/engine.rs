//! The `OxiLogic` engine: one entry point over the compiler, the prover,
//! the shared constraint session and an optional relation sink.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compiler::{CompiledProgram, LogicCompiler};
use crate::config::OxiLogicConfig;
use crate::error::{CompileError, OxiLogicError};
use crate::logic::ProgramFragment;
use crate::relations::{RelationRecord, RelationSink, SaveReport};
use crate::solver::{
    AddConstraintResponse, CheckResponse, OxizProver, ProofOutcome, Prover, ResetResponse,
    SessionHandle, StatusResponse, calculate, solve_equation,
};

/// Result of proving a natural-language argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalLanguageProof {
    /// The compiled program that was proven.
    pub compiled: CompiledProgram,
    /// The proof verdict.
    pub outcome: ProofOutcome,
    /// Result text for the caller.
    pub result: String,
}

/// Facade over every `OxiLogic` operation.
///
/// Cheap to share behind an `Arc`: compilation and proofs are stateless per
/// call, and the constraint session is reached through a handle.
pub struct LogicEngine {
    config: OxiLogicConfig,
    compiler: LogicCompiler,
    prover: Arc<dyn Prover>,
    session: SessionHandle,
    sink: Option<Arc<dyn RelationSink>>,
}

impl Default for LogicEngine {
    fn default() -> Self {
        Self::new(OxiLogicConfig::default())
    }
}

impl LogicEngine {
    /// Create an engine with the `OxiZ` prover and a fresh session.
    #[must_use]
    pub fn new(config: OxiLogicConfig) -> Self {
        Self {
            compiler: LogicCompiler::new(config.compiler.clone()),
            prover: Arc::new(OxizProver::new(config.prover.clone())),
            session: SessionHandle::spawn(config.session.clone()),
            sink: None,
            config,
        }
    }

    /// Replace the compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: LogicCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the prover.
    #[must_use]
    pub fn with_prover(mut self, prover: Arc<dyn Prover>) -> Self {
        self.prover = prover;
        self
    }

    /// Publish the semantic relations of every compile to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn RelationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &OxiLogicConfig {
        &self.config
    }

    /// A handle to the shared constraint session.
    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Compile natural-language premises and a conclusion.
    ///
    /// # Errors
    ///
    /// Returns a compile error for blank input or an unrecognized
    /// conclusion. Sink failures are logged, never returned.
    pub async fn compile(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<CompiledProgram, OxiLogicError> {
        let compiled = self.compiler.compile(premises, conclusion)?;
        tracing::info!(
            statements = compiled.premises.len(),
            relations = compiled.relations.len(),
            special_case = compiled.special_case.as_deref().unwrap_or("none"),
            "compiled"
        );
        self.publish(&compiled).await;
        Ok(compiled)
    }

    async fn publish(&self, compiled: &CompiledProgram) -> Option<SaveReport> {
        let sink = self.sink.as_ref()?;
        if compiled.relations.is_empty() {
            return None;
        }
        let records = compiled.relations.iter().map(RelationRecord::from).collect();
        let report = sink.save_relations(records).await;
        if report.failed_count > 0 {
            tracing::warn!(failed = report.failed_count, "some relations were not published");
        } else {
            tracing::debug!(saved = report.success_count, "relations published");
        }
        Some(report)
    }

    /// Prove a typed program.
    ///
    /// # Errors
    ///
    /// Returns an error naming the failing premise or conclusion.
    pub async fn prove_program(
        &self,
        program: &ProgramFragment,
    ) -> Result<ProofOutcome, OxiLogicError> {
        Ok(self.prover.prove(program).await?)
    }

    /// Prove premises and a conclusion written in the program vocabulary.
    ///
    /// # Errors
    ///
    /// Returns "No premises provided" or "No conclusion provided" for blank
    /// input, or an error naming the failing premise or conclusion.
    pub async fn prove_statements(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<ProofOutcome, OxiLogicError> {
        if premises.iter().all(|p| p.trim().is_empty()) {
            return Err(CompileError::NoPremises.into());
        }
        if conclusion.trim().is_empty() {
            return Err(CompileError::NoConclusion.into());
        }
        let premises: Vec<String> = premises
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Ok(self.prover.prove_text(&premises, conclusion.trim()).await?)
    }

    /// Compile a natural-language argument and prove it.
    ///
    /// # Errors
    ///
    /// Returns compile errors, or prover errors from the compiled program.
    pub async fn prove_natural_language(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<NaturalLanguageProof, OxiLogicError> {
        let compiled = self.compile(premises, conclusion).await?;
        let outcome = self.prover.prove(&compiled.program).await?;
        Ok(NaturalLanguageProof {
            result: outcome.message(),
            compiled,
            outcome,
        })
    }

    /// Add a constraint to the shared session.
    ///
    /// # Errors
    ///
    /// Returns a session error if the constraint is blank or malformed.
    pub async fn add_constraint(
        &self,
        constraint: &str,
    ) -> Result<AddConstraintResponse, OxiLogicError> {
        Ok(self.session.add_constraint(constraint).await?)
    }

    /// Check the shared session.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session has not been used yet.
    pub async fn check_satisfiability(&self) -> Result<CheckResponse, OxiLogicError> {
        Ok(self.session.check_satisfiability().await?)
    }

    /// Reset the shared session.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session actor is gone.
    pub async fn reset_session(&self) -> Result<ResetResponse, OxiLogicError> {
        Ok(self.session.reset().await?)
    }

    /// Status of the shared session.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session actor is gone.
    pub async fn session_status(&self) -> Result<StatusResponse, OxiLogicError> {
        Ok(self.session.status().await?)
    }

    /// Solve a one-shot system of constraints on the blocking pool.
    pub async fn solve_equation(&self, equation: &str) -> String {
        let equation = equation.to_string();
        let timeout_ms = self.config.session.timeout_ms;
        match tokio::task::spawn_blocking(move || solve_equation(&equation, timeout_ms)).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "equation task failed");
                "Solution unknown: the solver could not decide the given constraints".to_string()
            }
        }
    }

    /// Simplify an arithmetic expression or comparison.
    #[must_use]
    pub fn calculate(&self, equation: &str) -> String {
        calculate(equation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompilerConfig, ConclusionPolicy, SpecialCaseMode};
    use crate::error::SessionError;
    use crate::relations::InMemoryRelationSink;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_natural_language_socrates() {
        let engine = LogicEngine::default();
        let proof = engine
            .prove_natural_language(
                &strings(&["All humans are mortal.", "Socrates is a human."]),
                "Socrates is mortal.",
            )
            .await
            .unwrap();
        assert!(proof.outcome.is_proven());
        assert_eq!(
            proof.result,
            "Theorem proven: The conclusion follows from the premises."
        );
        assert_eq!(proof.compiled.conclusion, "Mortal(socrates)");
    }

    fn generic_engine() -> LogicEngine {
        LogicEngine::default().with_compiler(LogicCompiler::new(
            CompilerConfig::default()
                .with_special_cases(SpecialCaseMode::Disabled)
                .with_conclusion_policy(ConclusionPolicy::Reject),
        ))
    }

    #[tokio::test]
    async fn test_generic_pipeline_counterexample_for_flightless_tweety() {
        let proof = generic_engine()
            .prove_natural_language(
                &strings(&["All birds can fly.", "Tweety is a bird."]),
                "Tweety can not fly.",
            )
            .await
            .unwrap();
        assert!(proof.compiled.special_case.is_none());
        assert!(
            proof
                .result
                .starts_with("Theorem not proven: Found a counterexample."),
            "{}",
            proof.result
        );

        let ProofOutcome::CounterExample(assignments) = &proof.outcome else {
            panic!("expected a counterexample, got {:?}", proof.outcome);
        };
        assert!(assignments.iter().any(|(name, _)| name.starts_with("Fly(")));
        assert!(assignments.iter().any(|(name, _)| name.contains("tweety")));
        assert!(
            assignments
                .iter()
                .any(|(name, _)| name.to_lowercase().contains("bird"))
        );
    }

    #[tokio::test]
    async fn test_generic_pipeline_does_not_prove_socrates() {
        let proof = generic_engine()
            .prove_natural_language(
                &strings(&["All humans are mortal.", "Socrates is a human."]),
                "Socrates is mortal.",
            )
            .await
            .unwrap();
        assert!(proof.compiled.special_case.is_none());
        assert!(!proof.outcome.is_proven(), "{}", proof.result);
        assert_ne!(proof.compiled.conclusion, "");
    }

    #[tokio::test]
    async fn test_prove_statements_validation() {
        let engine = LogicEngine::default();
        let err = engine
            .prove_statements(&strings(&["  "]), "True")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Compile error: No premises provided");

        let err = engine
            .prove_statements(&strings(&["declare-sort Object"]), "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Compile error: No conclusion provided");
    }

    #[tokio::test]
    async fn test_prove_statements_premise_error() {
        let engine = LogicEngine::default();
        let err = engine
            .prove_statements(
                &strings(&["declare-sort Object", "assert Human(socrates)"]),
                "True",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OxiLogicError::Prover(_)));
        assert!(
            err.to_string()
                .contains("Error in premise 'assert Human(socrates)'")
        );
    }

    #[tokio::test]
    async fn test_session_through_engine() {
        let engine = LogicEngine::default();
        assert!(matches!(
            engine.check_satisfiability().await.unwrap_err(),
            OxiLogicError::Session(SessionError::Inactive)
        ));

        engine.add_constraint("x > 0").await.unwrap();
        engine.add_constraint("x < 0").await.unwrap();
        let check = engine.check_satisfiability().await.unwrap();
        assert_eq!(check.message, CheckResponse::UNSATISFIABLE);

        engine.reset_session().await.unwrap();
        let status = engine.session_status().await.unwrap();
        assert_eq!(status.constraints_count, 0);
        assert_eq!(status.status, "active");
    }

    #[tokio::test]
    async fn test_equation_helpers() {
        let engine = LogicEngine::default();
        assert_eq!(
            engine.solve_equation("x + y = 10, x = 3").await,
            "Solution found: x = 3, y = 7"
        );
        assert_eq!(engine.calculate("2 + 3 * 4"), "2 + 3 * 4 = 14");
    }

    #[tokio::test]
    async fn test_compile_publishes_relations() {
        let sink = Arc::new(InMemoryRelationSink::new());
        let compiler = LogicCompiler::new(
            CompilerConfig::default()
                .with_special_cases(SpecialCaseMode::Disabled)
                .with_conclusion_policy(ConclusionPolicy::AssumeTrue),
        );
        let engine = LogicEngine::default()
            .with_compiler(compiler)
            .with_sink(sink.clone());

        let compiled = engine
            .compile(&strings(&["Tom has a ball."]), "Tom has a ball.")
            .await
            .unwrap();
        assert!(!compiled.relations.is_empty());
        assert_eq!(sink.len().await, compiled.relations.len());
        let found = sink.find_relations("tom").await.unwrap();
        assert!(!found.is_empty());
        assert!(found.iter().all(|r| r.relation_type == "HAS"));
    }
}
