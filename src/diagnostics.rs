use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed class exactly as it was submitted, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedEntry {
    pub day: String,
    pub slot: String,
    pub room: String,
    pub subject: String,
    pub faculty: String,
}

/// Non-fatal findings produced while building one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Fixed class names an unknown day, slot, or room; it was skipped.
    FixedInvalid { entry: FixedEntry, reason: String },
    /// Fixed class targets the lunch slot; it was skipped.
    FixedInLunch { entry: FixedEntry },
    /// Fixed class overwrote another class in the same room.
    FixedRoomConflict { entry: FixedEntry, displaced: String },
    /// Fixed class double-books a faculty member within one slot.
    FixedFacultyConflict { entry: FixedEntry },
    LabUnplaced { lab: String, duration: usize },
    SubjectUnderScheduled {
        subject: String,
        placed: usize,
        required: usize,
    },
    /// A class pushed out of the lunch slot found no free room slot on its day.
    LunchRelocationDropped {
        day: String,
        room: String,
        subject: String,
    },
    SearchBudgetExhausted { explored: u64 },
    InputDefaulted { field: String, message: String },
    ReplacementRejected { message: String },
}

impl Diagnostic {
    pub fn input_defaulted(field: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic::InputDefaulted {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::FixedInvalid { .. } => "fixed_invalid",
            Diagnostic::FixedInLunch { .. } => "fixed_in_lunch",
            Diagnostic::FixedRoomConflict { .. } => "fixed_room_conflict",
            Diagnostic::FixedFacultyConflict { .. } => "fixed_faculty_conflict",
            Diagnostic::LabUnplaced { .. } => "lab_unplaced",
            Diagnostic::SubjectUnderScheduled { .. } => "subject_under_scheduled",
            Diagnostic::LunchRelocationDropped { .. } => "lunch_relocation_dropped",
            Diagnostic::SearchBudgetExhausted { .. } => "search_budget_exhausted",
            Diagnostic::InputDefaulted { .. } => "input_defaulted",
            Diagnostic::ReplacementRejected { .. } => "replacement_rejected",
        }
    }

    /// Conflict warnings leave the class in place; everything else is an omission or a correction.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Diagnostic::FixedRoomConflict { .. } | Diagnostic::FixedFacultyConflict { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FixedInvalid { entry, reason } => write!(
                f,
                "fixed class {} on {} {} in {} skipped: {reason}",
                entry.subject, entry.day, entry.slot, entry.room
            ),
            Diagnostic::FixedInLunch { entry } => write!(
                f,
                "fixed class {} on {} targets the lunch slot {}",
                entry.subject, entry.day, entry.slot
            ),
            Diagnostic::FixedRoomConflict { entry, displaced } => write!(
                f,
                "fixed class {} replaced {displaced} in {} on {} {}",
                entry.subject, entry.room, entry.day, entry.slot
            ),
            Diagnostic::FixedFacultyConflict { entry } => write!(
                f,
                "{} is booked twice on {} {}",
                entry.faculty, entry.day, entry.slot
            ),
            Diagnostic::LabUnplaced { lab, duration } => {
                write!(f, "lab {lab} ({duration} slots) could not be placed")
            }
            Diagnostic::SubjectUnderScheduled {
                subject,
                placed,
                required,
            } => write!(f, "{subject}: {placed}/{required} classes scheduled"),
            Diagnostic::LunchRelocationDropped { day, room, subject } => write!(
                f,
                "{subject} in {room} on {day} was dropped from the lunch slot"
            ),
            Diagnostic::SearchBudgetExhausted { explored } => write!(
                f,
                "lab search stopped after {explored} nodes; best partial placement kept"
            ),
            Diagnostic::InputDefaulted { field, message } => write!(f, "{field}: {message}"),
            Diagnostic::ReplacementRejected { message } => write!(f, "{message}"),
        }
    }
}
