//! Traits for the solving layer.

use async_trait::async_trait;

use super::prover::ProofOutcome;
use crate::error::ProverError;
use crate::logic::ProgramFragment;

/// Trait for theorem provers.
#[async_trait]
pub trait Prover: Send + Sync {
    /// Decide whether the program's premises entail its conclusion.
    ///
    /// # Errors
    ///
    /// Returns an error naming the premise or conclusion that could not be
    /// executed. An undecided proof is an [`ProofOutcome::Undetermined`]
    /// outcome, not an error.
    async fn prove(&self, program: &ProgramFragment) -> Result<ProofOutcome, ProverError>;

    /// Parse premises and a conclusion in the program vocabulary, then prove.
    ///
    /// # Errors
    ///
    /// Returns an error naming the premise or conclusion that failed to
    /// parse or execute.
    async fn prove_text(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<ProofOutcome, ProverError>;
}
