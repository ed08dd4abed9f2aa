//! Unified error types for `OxiLogic`.

use thiserror::Error;

/// The main error type for `OxiLogic` operations.
#[derive(Debug, Error)]
pub enum OxiLogicError {
    /// Statement or constraint parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Natural-language compilation errors
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Theorem prover errors
    #[error("Prover error: {0}")]
    Prover(#[from] ProverError),

    /// Incremental session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Relation sink errors
    #[error("Relation sink error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (native only)
    #[cfg(feature = "native")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A malformed statement, formula, or arithmetic constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    /// Byte offset into the source text where the problem was found.
    pub position: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    /// Create a parse error at the given byte offset.
    #[must_use]
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Errors raised while compiling natural language into a logic program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The request carried no premises.
    #[error("No premises provided")]
    NoPremises,

    /// The request carried an empty conclusion.
    #[error("No conclusion provided")]
    NoConclusion,

    /// No conclusion pattern matched and the policy rejects the `True` fallback.
    #[error("Unrecognized conclusion: {0}")]
    UnrecognizedConclusion(String),
}

/// Errors raised by the NLP toolkit. The compiler degrades on these instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlpError {
    /// The capability is not installed or not loaded.
    #[error("NLP capability unavailable: {0}")]
    Unavailable(String),

    /// The capability failed on a particular input.
    #[error("NLP processing failed: {0}")]
    Failed(String),
}

/// Errors raised while executing a program inside a proof attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProverError {
    /// A premise failed to parse or execute; the whole proof is aborted.
    #[error("Error in premise '{premise}': {reason}")]
    Premise {
        /// Source text of the offending premise.
        premise: String,
        /// What went wrong.
        reason: String,
    },

    /// The conclusion failed to parse or execute.
    #[error("Error in conclusion '{conclusion}': {reason}")]
    Conclusion {
        /// Source text of the conclusion.
        conclusion: String,
        /// What went wrong.
        reason: String,
    },

    /// A formula referenced a symbol with no declaration.
    #[error("name '{0}' is not declared")]
    UnknownSymbol(String),

    /// A function was applied to the wrong number of arguments.
    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Function name.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Arity at the call site.
        actual: usize,
    },

    /// An argument's sort disagrees with the declared domain.
    #[error("'{name}' expects sort {expected} at argument {index}, got {actual}")]
    SortMismatch {
        /// Function name.
        name: String,
        /// Zero-based argument index.
        index: usize,
        /// Declared sort.
        expected: String,
        /// Sort of the supplied term.
        actual: String,
    },

    /// A declaration named a sort that was never declared.
    #[error("sort '{0}' is not declared")]
    UnknownSort(String),

    /// The background proof task could not complete.
    #[error("Proof task failed: {0}")]
    Task(String),
}

/// Errors raised by the incremental constraint session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The constraint string was empty.
    #[error("No constraint provided")]
    EmptyConstraint,

    /// The constraint could not be parsed or elaborated.
    #[error("Error adding constraint: {0}")]
    Malformed(String),

    /// The session has not been created yet.
    #[error("No constraints have been added yet")]
    Inactive,

    /// The session actor has shut down.
    #[error("Session actor is no longer running")]
    Closed,
}

/// Errors raised by relation sinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The record lacks a source, target, or relation type.
    #[error("Missing required fields (source_node, target_node, or relation_type)")]
    MissingFields,

    /// The query string was empty.
    #[error("Query parameter is required")]
    EmptyQuery,

    /// Backend storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A type alias for Results with [`OxiLogicError`].
pub type Result<T> = std::result::Result<T, OxiLogicError>;
