use crate::diagnostics::{Diagnostic, FixedEntry};
use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use crate::input::Constraints;
use tracing::debug;

/// Writes every fixed class into the grid.
///
/// Entries naming an unknown day, slot, or room, or targeting the lunch slot,
/// are skipped. Room and faculty double-bookings are reported but the write
/// still happens, so the last entry for a room wins.
pub fn place_fixed_classes(grid: &mut TimeGrid, constraints: &Constraints) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for entry in constraints.fixed_classes() {
        let (day, slot, room) = match resolve_fixed(entry, constraints) {
            Ok(position) => position,
            Err(reason) => {
                diagnostics.push(Diagnostic::FixedInvalid {
                    entry: entry.clone(),
                    reason,
                });
                continue;
            }
        };
        if constraints.is_lunch(slot) {
            diagnostics.push(Diagnostic::FixedInLunch {
                entry: entry.clone(),
            });
            continue;
        }

        let cell = grid.cell(day, slot);
        if let Some(existing) = cell.occupant(room) {
            diagnostics.push(Diagnostic::FixedRoomConflict {
                entry: entry.clone(),
                displaced: format!("{} ({})", existing.subject, existing.faculty),
            });
        }
        let faculty_clash = !entry.faculty.is_empty()
            && cell
                .bookings()
                .iter()
                .any(|booking| booking.room != room && booking.class.faculty == entry.faculty);
        if faculty_clash {
            diagnostics.push(Diagnostic::FixedFacultyConflict {
                entry: entry.clone(),
            });
        }

        debug!(%day, slot = %entry.slot, room = %entry.room, subject = %entry.subject, "fixed class placed");
        grid.put(
            day,
            slot,
            room,
            ClassInfo::new(entry.subject.clone(), entry.faculty.clone()),
        );
    }
    diagnostics
}

pub(crate) fn resolve_fixed(
    entry: &FixedEntry,
    constraints: &Constraints,
) -> Result<(Day, usize, usize), String> {
    let day = entry
        .day
        .parse::<Day>()
        .map_err(|err| err.to_string())?;
    let slot = constraints
        .slot_index(&entry.slot)
        .ok_or_else(|| format!("unknown slot '{}'", entry.slot))?;
    let room = constraints
        .room_index(&entry.room)
        .ok_or_else(|| format!("unknown room '{}'", entry.room))?;
    Ok((day, slot, room))
}
