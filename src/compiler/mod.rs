//! Natural-language to first-order logic compilation.
//!
//! [`LogicCompiler`] runs the special-case library first and otherwise the
//! generic pipeline: analysis, vocabulary extraction, semantic triples,
//! declarations, per-statement translation and the conclusion.

pub mod assembler;
pub mod classifier;
pub mod context;
pub mod extractor;
pub mod negation;
pub mod patterns;
pub mod registry;
pub mod special_cases;

pub use assembler::{CompiledProgram, LogicCompiler};
pub use classifier::{StatementCategory, StatementTranslator, classify};
pub use context::{AnalyzedStatement, AnalyzedToken, ExtractionContext, SymbolSet};
pub use extractor::VocabularyExtractor;
pub use negation::{NegationDescriptor, NegationKind, detect_negation};
pub use patterns::{RelationKind, RelationMatcher, SemanticRelation};
pub use registry::DefinitionRegistry;
pub use special_cases::{SpecialCase, SpecialCaseHit, SpecialCaseLibrary};
