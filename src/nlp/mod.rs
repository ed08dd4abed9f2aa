//! Pluggable NLP preprocessing.
//!
//! The compiler only talks to the [`NlpToolkit`] trait. [`RuleBasedToolkit`]
//! is the default implementation; [`UnavailableToolkit`] stands in when no
//! NLP capability can be loaded.

pub mod lexicon;
pub mod rule_based;
pub mod traits;

pub use rule_based::RuleBasedToolkit;
pub use traits::{EntitySpan, NlpToolkit, PosTag, TaggedToken, UnavailableToolkit};

#[cfg(test)]
mod tests;
