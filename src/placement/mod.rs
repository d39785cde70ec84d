//! Placement phases run, in order, against one option's grid: fixed classes,
//! then labs, then theory classes.

pub mod fixed;
pub mod labs;
pub mod theory;

pub use fixed::place_fixed_classes;
pub use labs::{LabCandidate, LabOutcome, SearchBudget, lab_candidates, place_labs};
pub use theory::{TheoryOutcome, spread_theory};
