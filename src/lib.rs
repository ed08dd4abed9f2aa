//! `OxiLogic` - natural-language logic compilation and SMT-backed proving.
//!
//! `OxiLogic` turns short English arguments into typed first-order logic
//! programs and decides them with the `OxiZ` SMT solver:
//!
//! - **Compiler**: extracts entities, predicates and relations, detects
//!   negation, and assembles a declaration-ordered program
//! - **Prover**: refutes the negated conclusion against the premises in a
//!   fresh solver context per call
//! - **Session**: an incremental constraint store over real variables,
//!   shared through a serialized handle
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oxilogic::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), OxiLogicError> {
//!     let engine = LogicEngine::default();
//!
//!     let proof = engine
//!         .prove_natural_language(
//!             &["All humans are mortal.".into(), "Socrates is a human.".into()],
//!             "Socrates is mortal.",
//!         )
//!         .await?;
//!     println!("{}", proof.result);
//!
//!     engine.add_constraint("x + y = 10").await?;
//!     engine.add_constraint("x = 3").await?;
//!     let check = engine.check_satisfiability().await?;
//!     println!("{} {:?}", check.message, check.model);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `native` (default): load and save configuration files
//!
//! # Architecture
//!
//! ```text
//! Premises + Conclusion (English)
//!   │
//!   ▼
//! ┌──────────────────────┐
//! │  NLP toolkit         │  ← tokenize, tag, lemmatize, chunk entities
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │  Compiler            │  ← special cases, then the generic pipeline
//! └──────────┬───────────┘
//!            ▼
//!      ProgramFragment ──────────► RelationSink (optional)
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  Prover (OxiZ)       │  ← Proven / CounterExample / Undetermined
//! └──────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod nlp;
pub mod relations;
pub mod solver;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::compiler::{
        CompiledProgram, DefinitionRegistry, LogicCompiler, NegationDescriptor, NegationKind,
        RelationKind, SemanticRelation, SpecialCaseLibrary, StatementCategory,
    };
    pub use crate::config::{
        CompilerConfig, ConclusionPolicy, OxiLogicConfig, ProverConfig, SessionConfig,
        SpecialCaseMode,
    };
    pub use crate::engine::{LogicEngine, NaturalLanguageProof};
    pub use crate::error::{
        CompileError, NlpError, OxiLogicError, ParseError, ProverError, SessionError, SinkError,
    };
    pub use crate::logic::{
        ArithExpr, Constraint, Declaration, Formula, ProgramFragment, Statement, Term,
        parse_formula, parse_statement,
    };
    pub use crate::nlp::{NlpToolkit, RuleBasedToolkit, UnavailableToolkit};
    pub use crate::relations::{InMemoryRelationSink, RelationRecord, RelationSink, SaveReport};
    pub use crate::solver::{
        AddConstraintResponse, CheckResponse, IncrementalSession, OxizProver, ProofOutcome,
        Prover, ResetResponse, SessionHandle, StatusResponse, calculate, solve_equation,
    };
}

pub use error::{OxiLogicError, Result};

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_compile_then_prove_text_round_trip() {
        let engine = LogicEngine::default();
        let compiled = engine
            .compile(
                &strings(&["All humans are mortal.", "Socrates is a human."]),
                "Socrates is mortal.",
            )
            .await
            .expect("compile failed");

        let outcome = engine
            .prove_statements(&compiled.premises, &compiled.conclusion)
            .await
            .expect("proof failed");
        assert_eq!(outcome, ProofOutcome::Proven);
    }

    #[tokio::test]
    async fn test_typed_program_counterexample() {
        let engine = LogicEngine::default();
        let outcome = engine
            .prove_statements(
                &strings(&[
                    "declare-sort Object",
                    "declare-predicate Human Object",
                    "declare-predicate Immortal Object",
                    "declare-constant socrates Object",
                    "assert Human(socrates)",
                ]),
                "Immortal(socrates)",
            )
            .await
            .expect("proof failed");
        assert!(matches!(outcome, ProofOutcome::CounterExample(_)));
        assert!(
            outcome
                .message()
                .starts_with("Theorem not proven: Found a counterexample.")
        );
    }

    #[tokio::test]
    async fn test_session_scenario() {
        let session = SessionHandle::spawn(SessionConfig::default());
        session.add_constraint("x > 0").await.expect("add failed");
        session.add_constraint("x < 0").await.expect("add failed");
        let check = session.check_satisfiability().await.expect("check failed");
        assert!(!check.is_satisfiable());
        assert_eq!(check.constraints, vec!["x > 0", "x < 0"]);
    }

    #[test]
    fn test_config_serialization() {
        let config =
            OxiLogicConfig::new().with_prover(ProverConfig::default().with_timeout_ms(750));
        let json = config.to_json().expect("Failed to serialize");
        let parsed = OxiLogicConfig::from_json(&json).expect("Failed to deserialize");
        assert_eq!(parsed.prover.timeout_ms, 750);
    }
}
