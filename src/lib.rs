pub mod availability;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod grid;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod input;
pub mod lunch;
pub mod options;
pub mod persistence;
pub mod placement;
pub mod report;
pub mod solver;
pub mod strategy;
pub mod timetable;
pub mod validation;

pub use availability::AvailabilityIndex;
pub use config::{CONFIG_PATH_ENV, ConfigError, GeneticConfig, SolverConfig};
pub use diagnostics::{Diagnostic, FixedEntry};
pub use domain::{ClassInfo, Day, LUNCH_ROOM, LUNCH_SUBJECT};
pub use grid::TimeGrid;
pub use input::{
    Constraints, FacultyInput, FixedClassInput, LabInput, RoomInput, SubjectInput,
    TimetableRequest,
};
pub use lunch::{LunchReport, normalize_lunch};
pub use options::{
    OPTION_COUNT, TimetableOption, TimetableResponse, build_option, evolve_options,
    generate_options,
};
pub use persistence::{
    PersistenceError, load_options_from_json, load_request_from_json, load_timetable_from_csv,
    save_options_to_json, save_request_to_json, save_timetable_to_csv,
};
pub use solver::{GeneticSolver, Solution, Solver, StrategySolver};
pub use strategy::Strategy;
pub use timetable::{SlotEntry, Timetable};
pub use validation::{TimetableViolation, check_timetable, validate_timetable};
