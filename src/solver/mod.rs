//! Solvers turn normalized constraints into one filled grid plus the
//! diagnostics explaining anything left out.

mod genetic;

pub use genetic::{GeneticSolver, ScoredGrid, recommendation_for};

use crate::diagnostics::Diagnostic;
use crate::grid::TimeGrid;
use crate::input::Constraints;
use crate::lunch::{LunchReport, normalize_lunch};
use crate::placement::{place_fixed_classes, place_labs, spread_theory};
use crate::strategy::Strategy;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub grid: TimeGrid,
    pub diagnostics: Vec<Diagnostic>,
}

pub trait Solver {
    fn name(&self) -> &'static str;
    fn solve(&self, constraints: &Constraints) -> Solution;
}

/// The deterministic pipeline: lunch, fixed classes, labs, theory, lunch again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySolver {
    pub strategy: Strategy,
    pub search_budget: u64,
    pub relaxation_step: usize,
}

impl StrategySolver {
    pub fn new(strategy: Strategy, search_budget: u64, relaxation_step: usize) -> Self {
        Self {
            strategy,
            search_budget,
            relaxation_step,
        }
    }
}

impl Solver for StrategySolver {
    fn name(&self) -> &'static str {
        self.strategy.key()
    }

    fn solve(&self, constraints: &Constraints) -> Solution {
        let mut grid = TimeGrid::new(constraints.slots().len(), constraints.rooms().len());
        let mut diagnostics = Vec::new();

        normalize_lunch(&mut grid, constraints.lunch_slot());
        diagnostics.extend(place_fixed_classes(&mut grid, constraints));
        place_seeded_labs(
            &mut grid,
            constraints,
            self.strategy,
            self.search_budget,
            &mut diagnostics,
        );

        let theory = spread_theory(&mut grid, constraints, self.strategy, self.relaxation_step);
        for (idx, placed, required) in theory.shortfalls {
            diagnostics.push(Diagnostic::SubjectUnderScheduled {
                subject: constraints.subjects()[idx].name.clone(),
                placed,
                required,
            });
        }

        let report = normalize_lunch(&mut grid, constraints.lunch_slot());
        diagnostics.extend(lunch_diagnostics(&report, constraints));
        debug!(strategy = %self.strategy, classes = grid.class_count(), "strategy pipeline finished");

        Solution { grid, diagnostics }
    }
}

/// Runs the lab search and records what it could not do.
pub(crate) fn place_seeded_labs(
    grid: &mut TimeGrid,
    constraints: &Constraints,
    strategy: Strategy,
    search_budget: u64,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let labs = place_labs(grid, constraints, strategy, search_budget);
    if labs.budget_exhausted {
        diagnostics.push(Diagnostic::SearchBudgetExhausted {
            explored: labs.explored,
        });
    }
    for idx in labs.unplaced {
        let lab = &constraints.labs()[idx];
        diagnostics.push(Diagnostic::LabUnplaced {
            lab: lab.name.clone(),
            duration: lab.duration,
        });
    }
}

pub(crate) fn lunch_diagnostics(report: &LunchReport, constraints: &Constraints) -> Vec<Diagnostic> {
    report
        .dropped
        .iter()
        .map(|dropped| Diagnostic::LunchRelocationDropped {
            day: dropped.day.to_string(),
            room: constraints
                .rooms()
                .get(dropped.room)
                .cloned()
                .unwrap_or_default(),
            subject: dropped.class.subject.clone(),
        })
        .collect()
}
