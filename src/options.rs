use crate::config::SolverConfig;
use crate::diagnostics::Diagnostic;
use crate::input::{Constraints, TimetableRequest};
use crate::solver::{GeneticSolver, Solution, Solver, StrategySolver, recommendation_for};
use crate::strategy::Strategy;
use crate::timetable::Timetable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of options returned for a request.
pub const OPTION_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableOption {
    pub timetable: Timetable,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<f64>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl TimetableOption {
    pub fn has_conflicts(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_conflict)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableResponse {
    pub options: Vec<TimetableOption>,
}

/// Builds one option per strategy, in A, B, C order.
///
/// Never fails: infeasible labs or subjects leave the option partial and are
/// listed in its diagnostics.
pub fn generate_options(request: &TimetableRequest, config: &SolverConfig) -> TimetableResponse {
    let (constraints, input_diagnostics) = Constraints::from_request(request);
    let build = |strategy: Strategy| build_option(strategy, &constraints, &input_diagnostics, config);

    let options: Vec<TimetableOption> = if config.parallel {
        Strategy::ALL.par_iter().map(|&strategy| build(strategy)).collect()
    } else {
        Strategy::ALL.iter().map(|&strategy| build(strategy)).collect()
    };
    TimetableResponse { options }
}

pub fn build_option(
    strategy: Strategy,
    constraints: &Constraints,
    input_diagnostics: &[Diagnostic],
    config: &SolverConfig,
) -> TimetableOption {
    let solver = StrategySolver::new(strategy, config.search_budget, config.relaxation_step);
    let Solution { grid, diagnostics } = solver.solve(constraints);
    info!(
        strategy = %strategy,
        classes = grid.class_count(),
        diagnostics = diagnostics.len(),
        "option generated"
    );
    TimetableOption {
        timetable: Timetable::from_grid(&grid, constraints),
        recommendation: strategy.recommendation().to_string(),
        strategy: Some(strategy),
        fitness: None,
        diagnostics: input_diagnostics.iter().cloned().chain(diagnostics).collect(),
    }
}

/// Runs the population-based solver and returns its best distinct schedules.
///
/// Fewer than [`OPTION_COUNT`] options come back when the population
/// converges to fewer distinct grids.
pub fn evolve_options(request: &TimetableRequest, config: &SolverConfig) -> TimetableResponse {
    let (constraints, input_diagnostics) = Constraints::from_request(request);
    let solver = GeneticSolver::new(config.genetic.clone(), config.search_budget);
    let options = solver
        .evolve(&constraints, OPTION_COUNT)
        .into_iter()
        .map(|scored| {
            info!(
                fitness = scored.fitness,
                classes = scored.grid.class_count(),
                "evolved option"
            );
            TimetableOption {
                timetable: Timetable::from_grid(&scored.grid, &constraints),
                recommendation: recommendation_for(scored.fitness).to_string(),
                strategy: None,
                fitness: Some(scored.fitness),
                diagnostics: input_diagnostics
                    .iter()
                    .cloned()
                    .chain(scored.diagnostics)
                    .collect(),
            }
        })
        .collect();
    TimetableResponse { options }
}
