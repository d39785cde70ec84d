use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use crate::input::Constraints;
use crate::placement::fixed::resolve_fixed;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A broken hard rule in a finished (or hand-edited) timetable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableViolation {
    #[error("{faculty} teaches in more than one room on {day} at {slot}")]
    FacultyDoubleBooked {
        day: Day,
        slot: String,
        faculty: String,
    },
    #[error("lunch slot {slot} is not blocked on {day}")]
    LunchMissing { day: Day, slot: String },
    #[error("lunch slot {slot} on {day} also holds classes")]
    LunchNotExclusive { day: Day, slot: String },
    #[error("lunch marker outside the lunch slot on {day} at {slot}")]
    StrayLunch { day: Day, slot: String },
    #[error("fixed class {subject} missing from {day} {slot} in {room}")]
    FixedClassMissing {
        day: Day,
        slot: String,
        room: String,
        subject: String,
    },
    #[error("lab {lab} is spread over more than one day")]
    LabSplitAcrossDays { lab: String },
    #[error("lab {lab} uses more than one room")]
    LabSplitAcrossRooms { lab: String },
    #[error("lab {lab} occupies {found} slots, expected {expected}")]
    LabWrongLength {
        lab: String,
        expected: usize,
        found: usize,
    },
    #[error("lab {lab} slots are not consecutive")]
    LabNotContiguous { lab: String },
    #[error("{faculty} is not available for {subject} on {day} at {slot}")]
    FacultyUnavailable {
        day: Day,
        slot: String,
        subject: String,
        faculty: String,
    },
}

/// Collects every violation, in day then slot order.
///
/// Subjects placed fewer times than required are not violations; the solvers
/// report those as diagnostics.
pub fn validate_timetable(grid: &TimeGrid, constraints: &Constraints) -> Vec<TimetableViolation> {
    let mut violations = Vec::new();
    let label = |slot: usize| constraints.slots().get(slot).cloned().unwrap_or_default();

    for day in Day::ALL {
        for slot in 0..grid.slot_count() {
            let cell = grid.cell(day, slot);
            let mut seen = HashSet::new();
            for booking in cell.bookings() {
                let faculty = booking.class.faculty.as_str();
                if !faculty.is_empty() && !seen.insert(faculty) {
                    violations.push(TimetableViolation::FacultyDoubleBooked {
                        day,
                        slot: label(slot),
                        faculty: faculty.to_string(),
                    });
                }
            }

            if constraints.is_lunch(slot) {
                if !cell.is_lunch() {
                    violations.push(TimetableViolation::LunchMissing {
                        day,
                        slot: label(slot),
                    });
                } else if !cell.bookings().is_empty() {
                    violations.push(TimetableViolation::LunchNotExclusive {
                        day,
                        slot: label(slot),
                    });
                }
            } else if cell.is_lunch() {
                violations.push(TimetableViolation::StrayLunch {
                    day,
                    slot: label(slot),
                });
            }
        }
    }

    let fixed = effective_fixed(constraints);
    for ((day, slot, room), class) in &fixed {
        if grid.occupant(*day, *slot, *room) != Some(class) {
            violations.push(TimetableViolation::FixedClassMissing {
                day: *day,
                slot: label(*slot),
                room: constraints.rooms()[*room].clone(),
                subject: class.subject.clone(),
            });
        }
    }

    violations.extend(lab_violations(grid, constraints));

    let availability = constraints.availability();
    for (day, slot, booking) in grid.bookings() {
        if fixed.get(&(day, slot, booking.room)) == Some(&booking.class) {
            continue;
        }
        let class = &booking.class;
        if !availability.is_available(&class.subject, &class.faculty, day, slot) {
            violations.push(TimetableViolation::FacultyUnavailable {
                day,
                slot: label(slot),
                subject: class.subject.clone(),
                faculty: class.faculty.clone(),
            });
        }
    }

    violations
}

/// Fails with the first violation found.
pub fn check_timetable(grid: &TimeGrid, constraints: &Constraints) -> Result<(), TimetableViolation> {
    match validate_timetable(grid, constraints).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Fixed classes that can actually be placed, with later entries for the
/// same room overriding earlier ones.
fn effective_fixed(constraints: &Constraints) -> HashMap<(Day, usize, usize), ClassInfo> {
    let mut fixed = HashMap::new();
    for entry in constraints.fixed_classes() {
        if let Ok((day, slot, room)) = resolve_fixed(entry, constraints) {
            if !constraints.is_lunch(slot) {
                fixed.insert(
                    (day, slot, room),
                    ClassInfo::new(entry.subject.clone(), entry.faculty.clone()),
                );
            }
        }
    }
    fixed
}

fn lab_violations(grid: &TimeGrid, constraints: &Constraints) -> Vec<TimetableViolation> {
    let mut violations = Vec::new();
    for lab in constraints.labs() {
        // A theory subject sharing the lab's name makes occurrences ambiguous.
        if constraints.subjects().iter().any(|s| s.name == lab.name) {
            continue;
        }
        let placements: Vec<(Day, usize, usize)> = grid
            .bookings()
            .filter(|(_, _, booking)| booking.class.subject == lab.name)
            .map(|(day, slot, booking)| (day, slot, booking.room))
            .collect();
        if placements.is_empty() {
            continue;
        }

        let days: BTreeSet<Day> = placements.iter().map(|(day, _, _)| *day).collect();
        let rooms: BTreeSet<usize> = placements.iter().map(|(_, _, room)| *room).collect();
        if days.len() > 1 {
            violations.push(TimetableViolation::LabSplitAcrossDays {
                lab: lab.name.clone(),
            });
            continue;
        }
        if rooms.len() > 1 {
            violations.push(TimetableViolation::LabSplitAcrossRooms {
                lab: lab.name.clone(),
            });
            continue;
        }
        if placements.len() != lab.duration {
            violations.push(TimetableViolation::LabWrongLength {
                lab: lab.name.clone(),
                expected: lab.duration,
                found: placements.len(),
            });
            continue;
        }
        let first = placements.iter().map(|(_, slot, _)| *slot).min().unwrap_or(0);
        let last = placements.iter().map(|(_, slot, _)| *slot).max().unwrap_or(0);
        if last - first + 1 != placements.len() {
            violations.push(TimetableViolation::LabNotContiguous {
                lab: lab.name.clone(),
            });
        }
    }
    violations
}
