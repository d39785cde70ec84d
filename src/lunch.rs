use crate::domain::{ClassInfo, Day};
use crate::grid::TimeGrid;
use tracing::debug;

/// A class that had to leave the lunch slot and found nowhere to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedClass {
    pub day: Day,
    pub room: usize,
    pub class: ClassInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LunchReport {
    pub relocated: usize,
    pub dropped: Vec<DroppedClass>,
}

impl LunchReport {
    pub fn is_noop(&self) -> bool {
        self.relocated == 0 && self.dropped.is_empty()
    }
}

/// Forces the lunch slot to hold only the lunch marker on every day.
///
/// Markers outside the lunch slot are cleared (their room entries stay). Classes
/// found inside the lunch slot move, on the same day, to the first slot after
/// lunch, searching forward, then to the slots before it, searching backward,
/// where their room is empty and their faculty is not already teaching. A class
/// with no such slot is dropped and reported. Without a lunch slot this does
/// nothing. Running it again on its own output changes nothing.
pub fn normalize_lunch(grid: &mut TimeGrid, lunch: Option<usize>) -> LunchReport {
    let mut report = LunchReport::default();
    let Some(lunch) = lunch else {
        return report;
    };
    let slot_count = grid.slot_count();
    if lunch >= slot_count {
        return report;
    }

    let search_order: Vec<usize> = (lunch + 1..slot_count).chain((0..lunch).rev()).collect();

    for day in Day::ALL {
        for slot in (0..slot_count).filter(|&slot| slot != lunch) {
            if grid.cell(day, slot).is_lunch() {
                grid.cell_mut(day, slot).set_lunch(false);
            }
        }

        let displaced = grid.cell_mut(day, lunch).take_bookings();
        grid.cell_mut(day, lunch).set_lunch(true);

        for booking in displaced {
            let target = search_order.iter().copied().find(|&slot| {
                let cell = grid.cell(day, slot);
                cell.occupant(booking.room).is_none() && !cell.has_faculty(&booking.class.faculty)
            });
            match target {
                Some(slot) => {
                    debug!(%day, room = booking.room, to_slot = slot, "relocated class out of lunch");
                    grid.put(day, slot, booking.room, booking.class);
                    report.relocated += 1;
                }
                None => report.dropped.push(DroppedClass {
                    day,
                    room: booking.room,
                    class: booking.class,
                }),
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_marker_on_every_day() {
        let mut grid = TimeGrid::new(4, 1);
        let report = normalize_lunch(&mut grid, Some(2));
        assert!(report.is_noop());
        for day in Day::ALL {
            assert!(grid.cell(day, 2).is_lunch());
            assert!(grid.cell(day, 2).bookings().is_empty());
            assert!(!grid.cell(day, 1).is_lunch());
        }
    }

    #[test]
    fn relocates_forward_then_backward() {
        let mut grid = TimeGrid::new(4, 1);
        grid.put(Day::Monday, 2, 0, ClassInfo::new("Math", "A"));
        grid.put(Day::Monday, 3, 0, ClassInfo::new("Art", "B"));
        grid.put(Day::Tuesday, 2, 0, ClassInfo::new("Math", "A"));

        let report = normalize_lunch(&mut grid, Some(2));
        assert_eq!(report.relocated, 2);
        // Slot 3 is taken on Monday, so the search wraps back to slot 1.
        assert_eq!(grid.occupant(Day::Monday, 1, 0).unwrap().subject, "Math");
        assert_eq!(grid.occupant(Day::Tuesday, 3, 0).unwrap().subject, "Math");
    }

    #[test]
    fn drops_when_day_is_full() {
        let mut grid = TimeGrid::new(2, 1);
        grid.put(Day::Friday, 0, 0, ClassInfo::new("Art", "B"));
        grid.put(Day::Friday, 1, 0, ClassInfo::new("Math", "A"));
        let report = normalize_lunch(&mut grid, Some(1));
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].class.subject, "Math");
    }

    #[test]
    fn strips_stray_markers_and_is_idempotent() {
        let mut grid = TimeGrid::new(3, 2);
        grid.cell_mut(Day::Wednesday, 0).set_lunch(true);
        grid.put(Day::Wednesday, 0, 1, ClassInfo::new("Math", "A"));
        grid.put(Day::Wednesday, 1, 0, ClassInfo::new("Art", "B"));

        normalize_lunch(&mut grid, Some(1));
        assert!(!grid.cell(Day::Wednesday, 0).is_lunch());
        assert_eq!(grid.occupant(Day::Wednesday, 0, 1).unwrap().subject, "Math");
        assert_eq!(grid.occupant(Day::Wednesday, 2, 0).unwrap().subject, "Art");

        let snapshot = grid.clone();
        let second = normalize_lunch(&mut grid, Some(1));
        assert!(second.is_noop());
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn no_lunch_slot_is_noop() {
        let mut grid = TimeGrid::new(3, 1);
        grid.put(Day::Monday, 1, 0, ClassInfo::new("Math", "A"));
        let snapshot = grid.clone();
        assert!(normalize_lunch(&mut grid, None).is_noop());
        assert_eq!(grid, snapshot);
    }
}
