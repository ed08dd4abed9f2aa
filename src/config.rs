//! Configuration management for `OxiLogic`.

use serde::{Deserialize, Serialize};

/// Global configuration for `OxiLogic`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OxiLogicConfig {
    /// Natural-language compiler configuration.
    pub compiler: CompilerConfig,
    /// Theorem prover configuration.
    pub prover: ProverConfig,
    /// Incremental session configuration.
    pub session: SessionConfig,
}

/// How the special-case library decides whether a curated template applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialCaseMode {
    /// Match on sentence structure (token patterns).
    #[default]
    Structural,
    /// Match on loose keyword containment.
    Keyword,
    /// Never use curated templates; always run the generic pipeline.
    Disabled,
}

/// What to do when no conclusion pattern is recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConclusionPolicy {
    /// Fail the compile request.
    #[default]
    Reject,
    /// Fall back to the literal `True`.
    AssumeTrue,
}

/// Configuration for the natural-language compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Special-case matching mode.
    pub special_cases: SpecialCaseMode,
    /// Unrecognized conclusion policy.
    pub conclusion_policy: ConclusionPolicy,
    /// Relation phrases recognized in addition to the built-in dictionary.
    pub extra_relation_phrases: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            special_cases: SpecialCaseMode::Structural,
            conclusion_policy: ConclusionPolicy::Reject,
            extra_relation_phrases: Vec::new(),
        }
    }
}

impl CompilerConfig {
    /// Set the special-case mode.
    #[must_use]
    pub fn with_special_cases(mut self, mode: SpecialCaseMode) -> Self {
        self.special_cases = mode;
        self
    }

    /// Set the conclusion policy.
    #[must_use]
    pub fn with_conclusion_policy(mut self, policy: ConclusionPolicy) -> Self {
        self.conclusion_policy = policy;
        self
    }

    /// Add a relation phrase to the dictionary.
    #[must_use]
    pub fn with_relation_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.extra_relation_phrases.push(phrase.into().to_lowercase());
        self
    }
}

/// Configuration for the theorem prover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Timeout for a single proof in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound on ground instances produced per quantified formula.
    pub max_ground_instances: usize,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_ground_instances: 10_000,
        }
    }
}

impl ProverConfig {
    /// Set the proof timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the grounding bound.
    #[must_use]
    pub fn with_max_ground_instances(mut self, max: usize) -> Self {
        self.max_ground_instances = max;
        self
    }
}

/// Configuration for the incremental constraint session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Timeout for a satisfiability check in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl OxiLogicConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file (native only).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[cfg(feature = "native")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file (native only).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[cfg(feature = "native")]
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize configuration to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        let content = serde_json::to_string_pretty(self)?;
        Ok(content)
    }

    /// Set compiler configuration.
    #[must_use]
    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }

    /// Set prover configuration.
    #[must_use]
    pub fn with_prover(mut self, prover: ProverConfig) -> Self {
        self.prover = prover;
        self
    }

    /// Set session configuration.
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OxiLogicConfig::default();
        assert_eq!(config.prover.timeout_ms, 5000);
        assert_eq!(config.session.timeout_ms, 5000);
        assert_eq!(config.compiler.special_cases, SpecialCaseMode::Structural);
        assert_eq!(config.compiler.conclusion_policy, ConclusionPolicy::Reject);
    }

    #[test]
    fn test_config_builder() {
        let config = OxiLogicConfig::new()
            .with_compiler(
                CompilerConfig::default()
                    .with_special_cases(SpecialCaseMode::Disabled)
                    .with_relation_phrase("Sibling Of"),
            )
            .with_prover(ProverConfig::default().with_timeout_ms(250));

        assert_eq!(config.compiler.special_cases, SpecialCaseMode::Disabled);
        assert_eq!(config.compiler.extra_relation_phrases, vec!["sibling of"]);
        assert_eq!(config.prover.timeout_ms, 250);
    }

    #[test]
    fn test_config_serialization() {
        let config = OxiLogicConfig::default()
            .with_compiler(
                CompilerConfig::default().with_conclusion_policy(ConclusionPolicy::AssumeTrue),
            );
        let json = config.to_json().unwrap();
        let parsed = OxiLogicConfig::from_json(&json).unwrap();
        assert_eq!(parsed.compiler.conclusion_policy, ConclusionPolicy::AssumeTrue);
        assert_eq!(parsed.prover.max_ground_instances, 10_000);
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("oxilogic.json");
        let config = OxiLogicConfig::default().with_session(SessionConfig { timeout_ms: 42 });
        config.to_file(&path).unwrap();
        let loaded = OxiLogicConfig::from_file(&path).unwrap();
        assert_eq!(loaded.session.timeout_ms, 42);
    }
}
