//! Refutation-based theorem proving.
//!
//! Each proof runs in a [`ProofAttempt`]: a fresh symbol table, term manager
//! and solver that live for exactly one call. Premises are executed in
//! order, the negated conclusion is added, and the solver's verdict decides
//! the outcome.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use oxiz::solver::Solver;
use serde::{Deserialize, Serialize};

use super::backend::{FormulaEncoder, Verdict, render_value, solver_config};
use super::grounding::{
    HerbrandUniverse, SkolemConstant, ground_names, skolemize, to_nnf, universal_variables,
};
use super::traits::Prover;
use crate::config::ProverConfig;
use crate::error::ProverError;
use crate::logic::{
    Declaration, Formula, OBJECT_SORT, ProgramFragment, Statement, Term, parse_formula,
    parse_statement,
};

/// The verdict of one proof attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofOutcome {
    /// The premises entail the conclusion.
    Proven,
    /// A model of the premises falsifies the conclusion. Holds
    /// `(symbol, value)` pairs: declared constants, then ground atoms.
    CounterExample(Vec<(String, String)>),
    /// The solver could not decide within its limits.
    Undetermined,
}

impl ProofOutcome {
    /// Whether the conclusion was proven.
    #[must_use]
    pub fn is_proven(&self) -> bool {
        matches!(self, Self::Proven)
    }

    /// The caller-facing result text.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProofOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proven => {
                f.write_str("Theorem proven: The conclusion follows from the premises.")
            }
            Self::CounterExample(assignments) => {
                let rendered: Vec<String> = assignments
                    .iter()
                    .map(|(name, value)| format!("{name} = {value}"))
                    .collect();
                write!(
                    f,
                    "Theorem not proven: Found a counterexample. {}",
                    rendered.join(", ")
                )
            }
            Self::Undetermined => f.write_str("The theorem proof is undetermined."),
        }
    }
}

/// An isolated proving context for a single call.
#[derive(Debug, Clone)]
pub struct ProofAttempt {
    config: ProverConfig,
    sorts: Vec<String>,
    symbols: HashMap<String, Declaration>,
    constants: Vec<(String, String)>,
    assertions: Vec<Formula>,
}

impl ProofAttempt {
    /// Create a context in which only the `Object` sort exists.
    #[must_use]
    pub fn new(config: ProverConfig) -> Self {
        Self {
            config,
            sorts: vec![OBJECT_SORT.to_string()],
            symbols: HashMap::new(),
            constants: Vec::new(),
            assertions: Vec::new(),
        }
    }

    /// Execute one statement: record a declaration or check and queue an
    /// assertion.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement names an undeclared sort or
    /// symbol, or applies a function with the wrong arity or sorts.
    pub fn execute(&mut self, statement: &Statement) -> Result<(), ProverError> {
        match statement {
            Statement::Declare(decl) => self.declare(decl),
            Statement::Assert(formula) => {
                self.check_formula(formula, &mut Vec::new())?;
                self.assertions.push(formula.clone());
                Ok(())
            }
        }
    }

    fn require_sort(&self, sort: &str) -> Result<(), ProverError> {
        if self.sorts.iter().any(|s| s == sort) {
            Ok(())
        } else {
            Err(ProverError::UnknownSort(sort.to_string()))
        }
    }

    fn declare(&mut self, decl: &Declaration) -> Result<(), ProverError> {
        match decl {
            Declaration::Sort(name) => {
                if !self.sorts.contains(name) {
                    self.sorts.push(name.clone());
                }
                return Ok(());
            }
            Declaration::Constant { sort, .. } | Declaration::Variable { sort, .. } => {
                self.require_sort(sort)?;
            }
            Declaration::Predicate { domain, .. } | Declaration::Relation { domain, .. } => {
                for sort in domain {
                    self.require_sort(sort)?;
                }
            }
        }
        if self.symbols.contains_key(decl.name()) {
            tracing::debug!(name = decl.name(), "re-declaration ignored");
            return Ok(());
        }
        if let Declaration::Constant { name, sort } = decl {
            self.constants.push((name.clone(), sort.clone()));
        }
        self.symbols.insert(decl.name().to_string(), decl.clone());
        Ok(())
    }

    /// Sort of a quantifier variable: the sort of the declared constant or
    /// variable of the same name, else `Object`.
    fn variable_sort(&self, name: &str) -> String {
        match self.symbols.get(name) {
            Some(Declaration::Constant { sort, .. } | Declaration::Variable { sort, .. }) => {
                sort.clone()
            }
            _ => OBJECT_SORT.to_string(),
        }
    }

    fn term_sort(&self, term: &Term, bound: &[(String, String)]) -> Result<String, ProverError> {
        if let Term::Variable(name) = term
            && let Some((_, sort)) = bound.iter().rev().find(|(n, _)| n == name)
        {
            return Ok(sort.clone());
        }
        match self.symbols.get(term.name()) {
            Some(Declaration::Constant { sort, .. } | Declaration::Variable { sort, .. }) => {
                Ok(sort.clone())
            }
            _ => Err(ProverError::UnknownSymbol(term.name().to_string())),
        }
    }

    fn check_formula(
        &self,
        formula: &Formula,
        bound: &mut Vec<(String, String)>,
    ) -> Result<(), ProverError> {
        match formula {
            Formula::True | Formula::False => Ok(()),
            Formula::Atom { predicate, args } => {
                let domain = match self.symbols.get(predicate) {
                    Some(
                        Declaration::Predicate { domain, .. } | Declaration::Relation { domain, .. },
                    ) => domain,
                    _ => return Err(ProverError::UnknownSymbol(predicate.clone())),
                };
                if domain.len() != args.len() {
                    return Err(ProverError::ArityMismatch {
                        name: predicate.clone(),
                        expected: domain.len(),
                        actual: args.len(),
                    });
                }
                for (index, (arg, expected)) in args.iter().zip(domain).enumerate() {
                    let actual = self.term_sort(arg, bound)?;
                    if &actual != expected {
                        return Err(ProverError::SortMismatch {
                            name: predicate.clone(),
                            index,
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
                Ok(())
            }
            Formula::Equal(lhs, rhs) => {
                let expected = self.term_sort(lhs, bound)?;
                let actual = self.term_sort(rhs, bound)?;
                if expected == actual {
                    Ok(())
                } else {
                    Err(ProverError::SortMismatch {
                        name: "==".to_string(),
                        index: 1,
                        expected,
                        actual,
                    })
                }
            }
            Formula::Not(inner) => self.check_formula(inner, bound),
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().try_for_each(|p| self.check_formula(p, bound))
            }
            Formula::Implies(lhs, rhs) => {
                self.check_formula(lhs, bound)?;
                self.check_formula(rhs, bound)
            }
            Formula::ForAll { vars, body } | Formula::Exists { vars, body } => {
                let depth = bound.len();
                bound.extend(vars.iter().map(|v| (v.clone(), self.variable_sort(v))));
                let result = self.check_formula(body, bound);
                bound.truncate(depth);
                result
            }
        }
    }

    fn fresh_name(&self, base: &str, taken: &HashSet<String>) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.symbols.contains_key(&candidate) || taken.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        candidate
    }

    /// Add `Not(conclusion)` and ask the solver whether a model exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the conclusion is ill-formed against the
    /// declarations executed so far.
    pub fn refute(self, conclusion: &Formula) -> Result<ProofOutcome, ProverError> {
        self.check_formula(conclusion, &mut Vec::new())?;

        let mut goals: Vec<Formula> = self.assertions.iter().map(to_nnf).collect();
        goals.push(to_nnf(&conclusion.clone().negate()));

        let mut taken: HashSet<String> = HashSet::new();
        let mut skolems: Vec<SkolemConstant> = Vec::new();
        let goals: Vec<Formula> = goals
            .into_iter()
            .map(|goal| {
                let mut fresh = |var: &str| {
                    let name = self.fresh_name(&format!("sk_{var}"), &taken);
                    taken.insert(name.clone());
                    name
                };
                skolemize(goal, &mut fresh, &mut skolems)
            })
            .collect();

        let mut universe = HerbrandUniverse::new();
        let mut sort_of_ground: HashMap<String, String> = HashMap::new();
        for (name, sort) in &self.constants {
            universe.add(sort, name.clone());
            sort_of_ground.insert(name.clone(), sort.clone());
        }
        for skolem in &skolems {
            let sort = self.variable_sort(&skolem.variable);
            universe.add(&sort, skolem.name.clone());
            sort_of_ground.insert(skolem.name.clone(), sort);
        }
        for goal in &goals {
            for name in ground_names(goal) {
                if let Some(Declaration::Variable { sort, .. }) = self.symbols.get(&name) {
                    universe.add(sort, name.clone());
                    sort_of_ground.insert(name, sort.clone());
                }
            }
        }
        let mut witnesses = Vec::new();
        for goal in &goals {
            for var in universal_variables(goal) {
                let sort = self.variable_sort(&var);
                if !universe.is_inhabited(&sort) {
                    let base = format!("{}_witness", sort.to_lowercase());
                    let name = self.fresh_name(&base, &taken);
                    taken.insert(name.clone());
                    universe.add(&sort, name.clone());
                    witnesses.push(name);
                }
            }
        }

        let sort_of = |var: &str| self.variable_sort(var);
        let mut encoder = FormulaEncoder::new();
        let mut solver = Solver::with_config(solver_config(self.config.timeout_ms));
        for goal in &goals {
            let grounded = universe.expand(goal, &sort_of, self.config.max_ground_instances);
            let formula = grounded.as_ref().unwrap_or_else(|| {
                tracing::debug!(%goal, "outside the grounded fragment, using native quantifiers");
                goal
            });
            let term = encoder.encode(formula);
            solver.assert(term, encoder.terms_mut());
        }

        let verdict = Verdict::from(solver.check(encoder.terms_mut()));
        tracing::debug!(
            ?verdict,
            skolems = skolems.len(),
            witnesses = witnesses.len(),
            "proof check finished"
        );
        Ok(match verdict {
            Verdict::Unsat => ProofOutcome::Proven,
            Verdict::Unknown => ProofOutcome::Undetermined,
            Verdict::Sat => {
                let mut assignments = Vec::new();
                if let Some(model) = solver.model() {
                    for (name, _) in &self.constants {
                        if let Some(id) = encoder.existing_constant(name) {
                            let value = model.eval(id, encoder.terms_mut());
                            if let Some(rendered) = render_value(encoder.terms(), value) {
                                assignments.push((name.clone(), rendered));
                            }
                        }
                    }
                    let atoms = encoder.ground_atoms().to_vec();
                    for (name, id) in atoms {
                        let value = model.eval(id, encoder.terms_mut());
                        if let Some(rendered) = render_value(encoder.terms(), value) {
                            assignments.push((name, rendered));
                        }
                    }
                }
                ProofOutcome::CounterExample(assignments)
            }
        })
    }
}

/// Run a whole program in a fresh [`ProofAttempt`].
///
/// # Errors
///
/// Returns [`ProverError::Premise`] naming the first statement that fails,
/// or [`ProverError::Conclusion`] if the conclusion is ill-formed.
pub fn prove_program(
    program: &ProgramFragment,
    config: &ProverConfig,
) -> Result<ProofOutcome, ProverError> {
    let mut attempt = ProofAttempt::new(config.clone());
    for statement in &program.statements {
        attempt
            .execute(statement)
            .map_err(|e| ProverError::Premise {
                premise: statement.to_string(),
                reason: e.to_string(),
            })?;
    }
    attempt
        .refute(&program.conclusion)
        .map_err(|e| ProverError::Conclusion {
            conclusion: program.conclusion.to_string(),
            reason: e.to_string(),
        })
}

/// Parse premises and a conclusion written in the program vocabulary.
///
/// # Errors
///
/// Returns a premise or conclusion error carrying the parse failure.
pub fn parse_program(
    premises: &[String],
    conclusion: &str,
) -> Result<ProgramFragment, ProverError> {
    let statements = premises
        .iter()
        .map(|premise| {
            parse_statement(premise).map_err(|e| ProverError::Premise {
                premise: premise.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let conclusion_formula = parse_formula(conclusion).map_err(|e| ProverError::Conclusion {
        conclusion: conclusion.to_string(),
        reason: e.to_string(),
    })?;
    Ok(ProgramFragment::new(statements, conclusion_formula))
}

/// The `OxiZ`-backed prover. Proofs run on the blocking pool so several
/// can proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct OxizProver {
    config: ProverConfig,
}

impl OxizProver {
    /// Create a prover.
    #[must_use]
    pub fn new(config: ProverConfig) -> Self {
        Self { config }
    }

    /// The prover configuration.
    #[must_use]
    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// Prove on the current thread.
    ///
    /// # Errors
    ///
    /// See [`prove_program`].
    pub fn prove_blocking(&self, program: &ProgramFragment) -> Result<ProofOutcome, ProverError> {
        prove_program(program, &self.config)
    }
}

#[async_trait]
impl Prover for OxizProver {
    async fn prove(&self, program: &ProgramFragment) -> Result<ProofOutcome, ProverError> {
        let config = self.config.clone();
        let timeout_ms = config.timeout_ms;
        let program = program.clone();
        let task = tokio::task::spawn_blocking(move || prove_program(&program, &config));

        let outcome = if timeout_ms > 0 {
            // The solver enforces its own limit; this bounds setup and grounding too.
            match tokio::time::timeout(Duration::from_millis(timeout_ms.saturating_mul(2)), task)
                .await
            {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(timeout_ms, "proof timed out");
                    return Ok(ProofOutcome::Undetermined);
                }
            }
        } else {
            task.await
        };

        let outcome = outcome.map_err(|e| ProverError::Task(e.to_string()))?;
        match &outcome {
            Ok(result) => tracing::info!(proven = result.is_proven(), "proof finished"),
            Err(error) => tracing::warn!(%error, "proof aborted"),
        }
        outcome
    }

    async fn prove_text(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<ProofOutcome, ProverError> {
        let program = parse_program(premises, conclusion)?;
        self.prove(&program).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(ToString::to_string).collect()
    }

    fn socrates_premises() -> Vec<String> {
        lines(&[
            "declare-sort Object",
            "declare-predicate Human Object",
            "declare-predicate Mortal Object",
            "declare-constant socrates Object",
            "declare-variable x Object",
            "assert ForAll([x], Implies(Human(x), Mortal(x)))",
            "assert Human(socrates)",
        ])
    }

    fn prove(premises: &[String], conclusion: &str) -> Result<ProofOutcome, ProverError> {
        let program = parse_program(premises, conclusion)?;
        OxizProver::default().prove_blocking(&program)
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            ProofOutcome::Proven.message(),
            "Theorem proven: The conclusion follows from the premises."
        );
        assert_eq!(
            ProofOutcome::Undetermined.message(),
            "The theorem proof is undetermined."
        );
        let outcome = ProofOutcome::CounterExample(vec![
            ("tweety".into(), "0".into()),
            ("Fly(tweety)".into(), "False".into()),
        ]);
        assert_eq!(
            outcome.message(),
            "Theorem not proven: Found a counterexample. tweety = 0, Fly(tweety) = False"
        );
    }

    #[test]
    fn test_socrates_is_mortal() {
        let outcome = prove(&socrates_premises(), "Mortal(socrates)").unwrap();
        assert_eq!(outcome, ProofOutcome::Proven);
    }

    #[test]
    fn test_unsupported_conclusion_is_not_proven() {
        let mut premises = socrates_premises();
        premises.push("declare-predicate Immortal Object".into());
        let outcome = prove(&premises, "Immortal(socrates)").unwrap();
        let ProofOutcome::CounterExample(assignments) = outcome else {
            panic!("expected a counterexample");
        };
        assert!(
            assignments
                .iter()
                .any(|(name, value)| name == "Immortal(socrates)" && value == "False")
        );
    }

    #[test]
    fn test_tweety_bird_flight_not_proven() {
        let premises = lines(&[
            "declare-predicate Bird Object",
            "declare-predicate Fly Object",
            "declare-constant tweety Object",
            "assert Bird(tweety)",
        ]);
        let outcome = prove(&premises, "Fly(tweety)").unwrap();
        assert!(matches!(outcome, ProofOutcome::CounterExample(_)));
        assert!(outcome.message().starts_with("Theorem not proven: Found a counterexample."));
    }

    #[test]
    fn test_negated_universal_refutes_existential() {
        let premises = lines(&[
            "declare-predicate Bird Object",
            "declare-predicate Fly Object",
            "declare-variable x Object",
            "assert ForAll([x], Implies(Bird(x), Not(Fly(x))))",
            "assert Exists([x], Bird(x))",
        ]);
        let outcome = prove(&premises, "Exists([x], And(Bird(x), Not(Fly(x))))").unwrap();
        assert_eq!(outcome, ProofOutcome::Proven);
    }

    #[test]
    fn test_transitivity_over_sorted_constants() {
        let premises = lines(&[
            "declare-sort Person",
            "declare-relation Ancestor Person Person",
            "declare-constant alice Person",
            "declare-constant bob Person",
            "declare-constant carol Person",
            "declare-variable x Person",
            "declare-variable y Person",
            "declare-variable z Person",
            "assert ForAll([x, y, z], Implies(And(Ancestor(x, y), Ancestor(y, z)), Ancestor(x, z)))",
            "assert Ancestor(alice, bob)",
            "assert Ancestor(bob, carol)",
        ]);
        let outcome = prove(&premises, "Ancestor(alice, carol)").unwrap();
        assert_eq!(outcome, ProofOutcome::Proven);
    }

    #[test]
    fn test_empty_domain_gets_a_witness() {
        let premises = lines(&["declare-predicate P Object", "assert ForAll([x], P(x))"]);
        let outcome = prove(&premises, "Exists([y], P(y))").unwrap();
        assert_eq!(outcome, ProofOutcome::Proven);
    }

    #[test]
    fn test_premise_error_names_the_premise() {
        let premises = lines(&["declare-constant socrates Object", "assert Human(socrates)"]);
        let err = prove(&premises, "True").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in premise 'assert Human(socrates)': name 'Human' is not declared"
        );
    }

    #[test]
    fn test_parse_error_names_the_premise() {
        let premises = lines(&["assert Human(socrates"]);
        let err = prove(&premises, "True").unwrap_err();
        assert!(matches!(
            err,
            ProverError::Premise { ref premise, .. } if premise == "assert Human(socrates"
        ));
    }

    #[test]
    fn test_conclusion_error() {
        let err = prove(&socrates_premises(), "Mortal(plato)").unwrap_err();
        assert!(matches!(err, ProverError::Conclusion { .. }));
        assert!(err.to_string().starts_with("Error in conclusion 'Mortal(plato)'"));
    }

    #[test]
    fn test_sort_and_arity_checks() {
        let mut attempt = ProofAttempt::new(ProverConfig::default());
        for statement in [
            "declare-sort Set",
            "declare-relation SubsetOf Set Set",
            "declare-constant a Set",
            "declare-constant o Object",
        ] {
            attempt.execute(&parse_statement(statement).unwrap()).unwrap();
        }
        let arity = attempt.execute(&parse_statement("assert SubsetOf(a)").unwrap());
        assert!(matches!(
            arity,
            Err(ProverError::ArityMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));

        let sort = attempt.execute(&parse_statement("assert SubsetOf(a, o)").unwrap());
        assert!(matches!(sort, Err(ProverError::SortMismatch { index: 1, .. })));

        let unknown = attempt.execute(&parse_statement("declare-constant b Person").unwrap());
        assert_eq!(unknown, Err(ProverError::UnknownSort("Person".into())));
    }

    #[test]
    fn test_ground_limit_falls_back_to_native_quantifiers() {
        let config = ProverConfig::default().with_max_ground_instances(0);
        let program = parse_program(&socrates_premises(), "Mortal(socrates)").unwrap();
        let outcome = OxizProver::new(config).prove_blocking(&program).unwrap();
        // Native instantiation is incomplete, so only the absence of an error is checked.
        assert!(matches!(
            outcome,
            ProofOutcome::Proven | ProofOutcome::Undetermined | ProofOutcome::CounterExample(_)
        ));
    }

    #[tokio::test]
    async fn test_async_prove_text() {
        let prover = OxizProver::default();
        let outcome = prover
            .prove_text(&socrates_premises(), "Mortal(socrates)")
            .await
            .unwrap();
        assert!(outcome.is_proven());
    }

    #[tokio::test]
    async fn test_parallel_proofs_are_isolated() {
        let prover = OxizProver::default();
        let premises = socrates_premises();
        let proven = prover.prove_text(&premises, "Mortal(socrates)");
        let bird = lines(&[
            "declare-predicate Fly Object",
            "declare-constant tweety Object",
        ]);
        let unproven = prover.prove_text(&bird, "Fly(tweety)");
        let (proven, unproven) = tokio::join!(proven, unproven);
        assert!(proven.unwrap().is_proven());
        assert!(!unproven.unwrap().is_proven());
    }
}
