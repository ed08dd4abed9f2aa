//! The solving layer: refutation proofs, the incremental constraint session,
//! and one-shot equation solving, all backed by `OxiZ`.

pub mod backend;
pub mod equation;
pub mod grounding;
pub mod prover;
pub mod session;
pub mod shared;
pub mod traits;

pub use backend::Verdict;
pub use equation::{calculate, solve_equation};
pub use prover::{OxizProver, ProofAttempt, ProofOutcome, parse_program, prove_program};
pub use session::{
    AddConstraintResponse, CheckResponse, IncrementalSession, ResetResponse, StatusResponse,
};
pub use shared::SessionHandle;
pub use traits::Prover;
