use crate::availability::AvailabilityIndex;
use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use crate::input::Constraints;
use crate::strategy::Strategy;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TheoryOutcome {
    /// Classes placed per subject, indexed like `Constraints::subjects`.
    pub placed: Vec<usize>,
    /// `(subject index, placed, required)` for subjects left short.
    pub shortfalls: Vec<(usize, usize, usize)>,
}

struct Slotting {
    day: Day,
    slot: usize,
    room: usize,
    faculty: String,
}

/// Round-robin placement of weekly theory classes.
///
/// Each round gives every subject with remaining demand at most one class, at
/// the first free (day, slot, room, faculty) in strategy order whose day is
/// still under the per-subject cap. Rounds repeat until nothing moves; then the
/// cap is raised by `relaxation_step` and the rounds run once more.
pub fn spread_theory(
    grid: &mut TimeGrid,
    constraints: &Constraints,
    strategy: Strategy,
    relaxation_step: usize,
) -> TheoryOutcome {
    let subjects = constraints.subjects();
    let day_order = strategy.day_order();
    let slot_order = strategy.slot_order(constraints);

    let mut remaining: Vec<usize> = subjects.iter().map(|subject| subject.weekly).collect();
    let mut per_day = vec![[0usize; Day::COUNT]; subjects.len()];

    let base_cap = strategy.per_day_cap();
    for (pass, cap) in [base_cap, base_cap + relaxation_step].into_iter().enumerate() {
        if remaining.iter().all(|&left| left == 0) {
            break;
        }
        let mut progress = true;
        while progress {
            progress = false;
            for (idx, subject) in subjects.iter().enumerate() {
                if remaining[idx] == 0 {
                    continue;
                }
                let found = first_slotting(
                    grid,
                    constraints,
                    &subject.name,
                    &day_order,
                    &slot_order,
                    |day| per_day[idx][day.index()] < cap,
                );
                if let Some(choice) = found {
                    grid.put(
                        choice.day,
                        choice.slot,
                        choice.room,
                        ClassInfo::new(subject.name.clone(), choice.faculty),
                    );
                    per_day[idx][choice.day.index()] += 1;
                    remaining[idx] -= 1;
                    progress = true;
                }
            }
        }
        debug!(%strategy, pass, cap, "theory pass finished");
    }

    let placed: Vec<usize> = subjects
        .iter()
        .zip(&remaining)
        .map(|(subject, left)| subject.weekly - left)
        .collect();
    let shortfalls = subjects
        .iter()
        .enumerate()
        .filter(|(idx, _)| remaining[*idx] > 0)
        .map(|(idx, subject)| (idx, placed[idx], subject.weekly))
        .collect();
    TheoryOutcome { placed, shortfalls }
}

fn first_slotting<F>(
    grid: &TimeGrid,
    constraints: &Constraints,
    subject: &str,
    day_order: &[Day],
    slot_order: &[usize],
    day_open: F,
) -> Option<Slotting>
where
    F: Fn(Day) -> bool,
{
    let availability = constraints.availability();
    let faculty = availability.faculty_for(subject);
    if faculty.is_empty() {
        return None;
    }
    for &day in day_order {
        if !day_open(day) {
            continue;
        }
        for &slot in slot_order {
            for room in 0..constraints.rooms().len() {
                if !AvailabilityIndex::is_room_free(grid, day, slot, room) {
                    continue;
                }
                let teacher = faculty.iter().find(|name| {
                    availability.is_available(subject, name, day, slot)
                        && AvailabilityIndex::is_faculty_free(grid, day, slot, name)
                });
                if let Some(name) = teacher {
                    return Some(Slotting {
                        day,
                        slot,
                        room,
                        faculty: name.to_string(),
                    });
                }
            }
        }
    }
    None
}
