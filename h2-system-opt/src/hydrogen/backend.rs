use std::fmt;

use good_lp::solvers::SolutionStatus;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    VariableDefinition,
};
use tracing::debug;

use crate::hydrogen::h2_system_utils::SolverSettings;

/// Why a solve produced no usable point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibilityKind {
    Infeasible,
    Unbounded,
}

/// Terminal state of a single solve. Results are only reachable through the first two variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome<T> {
    /// Proven optimum within the configured tolerance.
    Optimal(T),
    /// The time or gap limit stopped the solver at a feasible point.
    FeasibleSuboptimal(T),
    Infeasible(InfeasibilityKind),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    FeasibleSuboptimal,
    Infeasible,
    Unbounded,
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::FeasibleSuboptimal => "feasible (limit reached)",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "solver error",
        };
        f.write_str(label)
    }
}

impl<T> SolveOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SolveOutcome<U> {
        match self {
            SolveOutcome::Optimal(value) => SolveOutcome::Optimal(f(value)),
            SolveOutcome::FeasibleSuboptimal(value) => SolveOutcome::FeasibleSuboptimal(f(value)),
            SolveOutcome::Infeasible(kind) => SolveOutcome::Infeasible(kind),
            SolveOutcome::Error(message) => SolveOutcome::Error(message),
        }
    }

    pub fn status(&self) -> SolveStatus {
        match self {
            SolveOutcome::Optimal(_) => SolveStatus::Optimal,
            SolveOutcome::FeasibleSuboptimal(_) => SolveStatus::FeasibleSuboptimal,
            SolveOutcome::Infeasible(InfeasibilityKind::Infeasible) => SolveStatus::Infeasible,
            SolveOutcome::Infeasible(InfeasibilityKind::Unbounded) => SolveStatus::Unbounded,
            SolveOutcome::Error(_) => SolveStatus::Error,
        }
    }

    pub fn solution(&self) -> Option<&T> {
        match self {
            SolveOutcome::Optimal(value) | SolveOutcome::FeasibleSuboptimal(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<T> {
        match self {
            SolveOutcome::Optimal(value) | SolveOutcome::FeasibleSuboptimal(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }
}

/// A linear programming engine the sizing model can be handed to.
///
/// Variables and constraints are collected first; the solver only sees the problem in `solve`,
/// which consumes the backend so every instance serves exactly one solve.
pub trait LpBackend {
    type Solution: Solution;

    fn add_variable(&mut self, definition: VariableDefinition) -> Variable;

    fn add_linear_constraint(&mut self, constraint: Constraint);

    fn set_objective(&mut self, objective: Expression);

    fn solve(self, settings: &SolverSettings) -> SolveOutcome<Self::Solution>;

    /// Number of constraints added so far.
    fn constraint_count(&self) -> usize;
}

/// Problem collected ahead of solver selection.
struct ProblemDraft {
    variables: ProblemVariables,
    constraints: Vec<Constraint>,
    objective: Expression,
    variable_count: usize,
}

impl Default for ProblemDraft {
    fn default() -> Self {
        Self {
            variables: ProblemVariables::new(),
            constraints: Vec::new(),
            objective: Expression::default(),
            variable_count: 0,
        }
    }
}

impl ProblemDraft {
    fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        self.variable_count += 1;
        self.variables.add(definition)
    }
}

fn classify<S: Solution>(result: Result<S, ResolutionError>) -> SolveOutcome<S> {
    match result {
        Ok(solution) => {
            if matches!(solution.status(), SolutionStatus::Optimal) {
                SolveOutcome::Optimal(solution)
            } else {
                SolveOutcome::FeasibleSuboptimal(solution)
            }
        }
        Err(ResolutionError::Infeasible) => SolveOutcome::Infeasible(InfeasibilityKind::Infeasible),
        Err(ResolutionError::Unbounded) => SolveOutcome::Infeasible(InfeasibilityKind::Unbounded),
        Err(e) => SolveOutcome::Error(e.to_string()),
    }
}

/// HiGHS through `good_lp`, honouring every solver setting.
#[derive(Default)]
pub struct HighsBackend {
    draft: ProblemDraft,
}

impl HighsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LpBackend for HighsBackend {
    type Solution = good_lp::solvers::highs::HighsSolution;

    fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        self.draft.add_variable(definition)
    }

    fn add_linear_constraint(&mut self, constraint: Constraint) {
        self.draft.constraints.push(constraint);
    }

    fn set_objective(&mut self, objective: Expression) {
        self.draft.objective = objective;
    }

    fn constraint_count(&self) -> usize {
        self.draft.constraints.len()
    }

    fn solve(self, settings: &SolverSettings) -> SolveOutcome<Self::Solution> {
        let ProblemDraft {
            variables,
            constraints,
            objective,
            variable_count,
        } = self.draft;
        debug!(
            variables = variable_count,
            constraints = constraints.len(),
            method = %settings.method,
            crossover = settings.crossover,
            "handing model to HiGHS"
        );

        let mut model = variables.minimise(objective).using(good_lp::highs);
        model.set_verbose(false);
        let mut model = model
            .set_option("solver", settings.method.highs_name())
            .set_option("run_crossover", if settings.crossover { "on" } else { "off" })
            .set_option("mip_rel_gap", settings.mip_rel_gap)
            .set_time_limit(settings.time_limit_secs)
            .set_threads(settings.threads);
        for constraint in constraints {
            model = model.with(constraint);
        }

        classify(model.solve())
    }
}

/// Clarabel interior point solver through `good_lp`.
///
/// Only the time limit and relative gap apply; thread count, method and crossover are HiGHS
/// settings and are ignored here.
#[derive(Default)]
pub struct ClarabelBackend {
    draft: ProblemDraft,
}

impl ClarabelBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LpBackend for ClarabelBackend {
    type Solution = good_lp::solvers::clarabel::ClarabelSolution;

    fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        self.draft.add_variable(definition)
    }

    fn add_linear_constraint(&mut self, constraint: Constraint) {
        self.draft.constraints.push(constraint);
    }

    fn set_objective(&mut self, objective: Expression) {
        self.draft.objective = objective;
    }

    fn constraint_count(&self) -> usize {
        self.draft.constraints.len()
    }

    fn solve(self, settings: &SolverSettings) -> SolveOutcome<Self::Solution> {
        let ProblemDraft {
            variables,
            constraints,
            objective,
            variable_count,
        } = self.draft;
        debug!(
            variables = variable_count,
            constraints = constraints.len(),
            "handing model to Clarabel"
        );

        let mut model = variables.minimise(objective).using(good_lp::clarabel);
        model
            .settings()
            .verbose(false)
            .time_limit(settings.time_limit_secs)
            .tol_gap_rel(settings.mip_rel_gap);
        for constraint in constraints {
            model = model.with(constraint);
        }

        classify(model.solve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use good_lp::{constraint, variable};

    fn small_problem<B: LpBackend>(mut backend: B, lower: f64) -> (B, Variable, Variable) {
        let x = backend.add_variable(variable().min(0.0));
        let y = backend.add_variable(variable().min(0.0));
        backend.add_linear_constraint(constraint!(x + y >= lower));
        backend.add_linear_constraint(constraint!(x <= 3.0));
        backend.set_objective(2.0 * x + 3.0 * y);
        (backend, x, y)
    }

    #[test]
    fn test_highs_optimal() {
        let (backend, x, y) = small_problem(HighsBackend::new(), 5.0);
        assert_eq!(backend.constraint_count(), 2);

        let outcome = backend.solve(&SolverSettings::default());
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        let solution = outcome.solution().unwrap();
        assert!((solution.value(x) - 3.0).abs() < 1e-6);
        assert!((solution.value(y) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_highs_infeasible() {
        let (mut backend, x, _) = small_problem(HighsBackend::new(), 5.0);
        backend.add_linear_constraint(constraint!(x >= 4.0));

        let outcome = backend.solve(&SolverSettings::default());
        assert!(matches!(
            outcome,
            SolveOutcome::Infeasible(InfeasibilityKind::Infeasible)
        ));
        assert!(outcome.solution().is_none());
    }

    #[test]
    fn test_clarabel_optimal() {
        let (backend, x, y) = small_problem(ClarabelBackend::new(), 5.0);
        let settings = SolverSettings {
            mip_rel_gap: 1e-8,
            ..SolverSettings::default()
        };

        let outcome = backend.solve(&settings);
        assert!(outcome.solution().is_some());
        let solution = outcome.into_solution().unwrap();
        assert!((solution.value(x) - 3.0).abs() < 1e-4);
        assert!((solution.value(y) - 2.0).abs() < 1e-4);
    }

    struct FixedStatus(SolutionStatus);

    impl Solution for FixedStatus {
        fn status(&self) -> SolutionStatus {
            self.0
        }

        fn value(&self, _variable: Variable) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_limit_statuses_are_feasible_suboptimal() {
        for status in [SolutionStatus::TimeLimit, SolutionStatus::GapLimit] {
            let outcome = classify(Ok(FixedStatus(status)));
            assert_eq!(outcome.status(), SolveStatus::FeasibleSuboptimal);
            assert!(outcome.solution().is_some());
        }
        assert!(classify(Ok(FixedStatus(SolutionStatus::Optimal))).is_optimal());
    }

    #[test]
    fn test_solver_failures_are_errors() {
        let outcome = classify::<FixedStatus>(Err(ResolutionError::Other("SolveError")));
        assert_eq!(outcome.status(), SolveStatus::Error);
        assert!(outcome.solution().is_none());

        let outcome = classify::<FixedStatus>(Err(ResolutionError::Unbounded));
        assert_eq!(outcome.status(), SolveStatus::Unbounded);
    }

    #[test]
    fn test_outcome_map_keeps_status() {
        let outcome: SolveOutcome<u32> = SolveOutcome::FeasibleSuboptimal(2);
        let mapped = outcome.map(|value| value * 10);
        assert_eq!(mapped, SolveOutcome::FeasibleSuboptimal(20));
        assert!(!mapped.is_optimal());

        let failed: SolveOutcome<u32> = SolveOutcome::Error("boom".to_string());
        assert_eq!(failed.map(|value| value + 1).status(), SolveStatus::Error);
        assert_eq!(SolveStatus::Unbounded.to_string(), "unbounded");
    }
}
