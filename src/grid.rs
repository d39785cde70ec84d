use crate::domain::{ClassInfo, Day};

/// A class booked into one room of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub room: usize,
    pub class: ClassInfo,
}

/// Occupancy of one (day, slot). A lunch cell carries the marker and no bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    lunch: bool,
    bookings: Vec<Booking>,
}

impl Cell {
    pub fn is_lunch(&self) -> bool {
        self.lunch
    }

    pub fn is_empty(&self) -> bool {
        !self.lunch && self.bookings.is_empty()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn occupant(&self, room: usize) -> Option<&ClassInfo> {
        self.bookings
            .iter()
            .find(|booking| booking.room == room)
            .map(|booking| &booking.class)
    }

    pub fn has_faculty(&self, faculty: &str) -> bool {
        self.bookings
            .iter()
            .any(|booking| booking.class.faculty == faculty)
    }

    /// Books `class` into `room`, returning whatever it displaced.
    pub fn put(&mut self, room: usize, class: ClassInfo) -> Option<ClassInfo> {
        match self.bookings.iter_mut().find(|booking| booking.room == room) {
            Some(existing) => Some(std::mem::replace(&mut existing.class, class)),
            None => {
                self.bookings.push(Booking { room, class });
                None
            }
        }
    }

    pub fn remove(&mut self, room: usize) -> Option<ClassInfo> {
        let position = self.bookings.iter().position(|booking| booking.room == room)?;
        Some(self.bookings.remove(position).class)
    }

    pub(crate) fn set_lunch(&mut self, lunch: bool) {
        self.lunch = lunch;
    }

    pub(crate) fn take_bookings(&mut self) -> Vec<Booking> {
        std::mem::take(&mut self.bookings)
    }
}

/// Week grid indexed by day × slot position. Slot adjacency is positional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    slot_count: usize,
    room_count: usize,
    cells: Vec<Cell>,
}

impl TimeGrid {
    pub fn new(slot_count: usize, room_count: usize) -> Self {
        Self {
            slot_count,
            room_count,
            cells: vec![Cell::default(); Day::COUNT * slot_count],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn room_count(&self) -> usize {
        self.room_count
    }

    fn offset(&self, day: Day, slot: usize) -> usize {
        debug_assert!(slot < self.slot_count, "slot {slot} out of range");
        day.index() * self.slot_count + slot
    }

    pub fn cell(&self, day: Day, slot: usize) -> &Cell {
        &self.cells[self.offset(day, slot)]
    }

    pub fn cell_mut(&mut self, day: Day, slot: usize) -> &mut Cell {
        let offset = self.offset(day, slot);
        &mut self.cells[offset]
    }

    pub fn occupant(&self, day: Day, slot: usize, room: usize) -> Option<&ClassInfo> {
        self.cell(day, slot).occupant(room)
    }

    pub fn put(&mut self, day: Day, slot: usize, room: usize, class: ClassInfo) -> Option<ClassInfo> {
        self.cell_mut(day, slot).put(room, class)
    }

    pub fn remove(&mut self, day: Day, slot: usize, room: usize) -> Option<ClassInfo> {
        self.cell_mut(day, slot).remove(room)
    }

    /// Every booking in day, slot, room order of insertion.
    pub fn bookings(&self) -> impl Iterator<Item = (Day, usize, &Booking)> + '_ {
        Day::ALL.into_iter().flat_map(move |day| {
            (0..self.slot_count)
                .flat_map(move |slot| self.cell(day, slot).bookings().iter().map(move |b| (day, slot, b)))
        })
    }

    pub fn count_subject(&self, subject: &str) -> usize {
        self.bookings()
            .filter(|(_, _, booking)| booking.class.subject == subject)
            .count()
    }

    pub fn count_subject_on(&self, day: Day, subject: &str) -> usize {
        (0..self.slot_count)
            .flat_map(|slot| self.cell(day, slot).bookings())
            .filter(|booking| booking.class.subject == subject)
            .count()
    }

    pub fn class_count(&self) -> usize {
        self.bookings().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_existing_room_entry() {
        let mut grid = TimeGrid::new(3, 2);
        assert!(grid.put(Day::Monday, 1, 0, ClassInfo::new("Math", "A")).is_none());
        let displaced = grid.put(Day::Monday, 1, 0, ClassInfo::new("Physics", "B"));
        assert_eq!(displaced, Some(ClassInfo::new("Math", "A")));
        assert_eq!(grid.cell(Day::Monday, 1).bookings().len(), 1);
        assert_eq!(grid.occupant(Day::Monday, 1, 0).unwrap().subject, "Physics");
    }

    #[test]
    fn remove_and_counts() {
        let mut grid = TimeGrid::new(4, 2);
        grid.put(Day::Tuesday, 0, 0, ClassInfo::new("Math", "A"));
        grid.put(Day::Tuesday, 1, 1, ClassInfo::new("Math", "B"));
        grid.put(Day::Friday, 3, 1, ClassInfo::new("Art", "C"));
        assert_eq!(grid.count_subject("Math"), 2);
        assert_eq!(grid.count_subject_on(Day::Tuesday, "Math"), 2);
        assert_eq!(grid.class_count(), 3);
        assert_eq!(grid.remove(Day::Tuesday, 0, 0).unwrap().faculty, "A");
        assert!(grid.remove(Day::Tuesday, 0, 0).is_none());
        assert_eq!(grid.count_subject("Math"), 1);
    }
}
