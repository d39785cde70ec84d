use crate::diagnostics::Diagnostic;
use crate::domain::{ClassInfo, Day, LUNCH_ROOM};
use crate::grid::TimeGrid;
use crate::input::Constraints;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Classes held in one slot of one day, keyed by room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub slot: String,
    pub rooms: Vec<(String, ClassInfo)>,
}

impl SlotEntry {
    pub fn get(&self, room: &str) -> Option<&ClassInfo> {
        self.rooms
            .iter()
            .find(|(name, _)| name == room)
            .map(|(_, class)| class)
    }

    pub fn is_lunch(&self) -> bool {
        self.get(LUNCH_ROOM).is_some()
    }

    /// True when the slot holds the lunch marker and nothing else.
    pub fn is_pure_lunch(&self) -> bool {
        self.rooms.len() == 1 && self.is_lunch()
    }
}

/// The caller-facing weekly timetable: day → slot → room → class.
///
/// Every teaching day is present. Slots with nothing in them are left out,
/// except the lunch slot, which is always listed when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    days: BTreeMap<Day, Vec<SlotEntry>>,
}

impl Default for Timetable {
    fn default() -> Self {
        Self {
            days: Day::ALL.into_iter().map(|day| (day, Vec::new())).collect(),
        }
    }
}

impl Timetable {
    pub fn from_grid(grid: &TimeGrid, constraints: &Constraints) -> Self {
        let mut timetable = Self::default();
        for day in Day::ALL {
            let slots = timetable.days.entry(day).or_default();
            for (slot, label) in constraints.slots().iter().enumerate().take(grid.slot_count()) {
                let cell = grid.cell(day, slot);
                if cell.is_empty() {
                    continue;
                }
                let mut rooms = Vec::with_capacity(cell.bookings().len() + 1);
                if cell.is_lunch() {
                    rooms.push((LUNCH_ROOM.to_string(), ClassInfo::lunch()));
                }
                let mut bookings: Vec<_> = cell.bookings().iter().collect();
                bookings.sort_by_key(|booking| booking.room);
                for booking in bookings {
                    let room = constraints
                        .rooms()
                        .get(booking.room)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", booking.room));
                    rooms.push((room, booking.class.clone()));
                }
                slots.push(SlotEntry {
                    slot: label.clone(),
                    rooms,
                });
            }
        }
        timetable
    }

    /// Rebuilds a grid from a full replacement timetable. Entries naming an
    /// unknown slot or room are skipped and reported.
    pub fn to_grid(&self, constraints: &Constraints) -> (TimeGrid, Vec<Diagnostic>) {
        let mut grid = TimeGrid::new(constraints.slots().len(), constraints.rooms().len());
        let mut diagnostics = Vec::new();
        for (day, slots) in &self.days {
            for entry in slots {
                let Some(slot) = constraints.slot_index(&entry.slot) else {
                    diagnostics.push(Diagnostic::ReplacementRejected {
                        message: format!("{day}: unknown slot '{}'", entry.slot),
                    });
                    continue;
                };
                for (room, class) in &entry.rooms {
                    if room == LUNCH_ROOM {
                        grid.cell_mut(*day, slot).set_lunch(true);
                        continue;
                    }
                    match constraints.room_index(room) {
                        Some(room) => {
                            grid.put(*day, slot, room, class.clone());
                        }
                        None => diagnostics.push(Diagnostic::ReplacementRejected {
                            message: format!("{day} {}: unknown room '{room}'", entry.slot),
                        }),
                    }
                }
            }
        }
        (grid, diagnostics)
    }

    pub fn days(&self) -> impl Iterator<Item = (Day, &[SlotEntry])> + '_ {
        self.days.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    pub fn slots(&self, day: Day) -> &[SlotEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, day: Day, slot: &str) -> Option<&SlotEntry> {
        self.slots(day).iter().find(|entry| entry.slot == slot)
    }

    pub fn get(&self, day: Day, slot: &str, room: &str) -> Option<&ClassInfo> {
        self.cell(day, slot).and_then(|entry| entry.get(room))
    }

    pub fn is_lunch(&self, day: Day, slot: &str) -> bool {
        self.cell(day, slot).is_some_and(SlotEntry::is_lunch)
    }

    /// Flat `(day, slot, room, class)` rows in timetable order.
    pub fn entries(&self) -> impl Iterator<Item = (Day, &str, &str, &ClassInfo)> + '_ {
        self.days.iter().flat_map(|(day, slots)| {
            slots.iter().flat_map(move |entry| {
                entry
                    .rooms
                    .iter()
                    .map(move |(room, class)| (*day, entry.slot.as_str(), room.as_str(), class))
            })
        })
    }

    /// Real classes only; lunch markers are not counted.
    pub fn count_subject(&self, subject: &str) -> usize {
        self.entries()
            .filter(|(_, _, room, class)| *room != LUNCH_ROOM && class.subject == subject)
            .count()
    }

    /// Appends one room entry, creating the slot on first use.
    pub fn insert(&mut self, day: Day, slot: &str, room: &str, class: ClassInfo) {
        let slots = self.days.entry(day).or_default();
        let position = match slots.iter().position(|entry| entry.slot == slot) {
            Some(position) => position,
            None => {
                slots.push(SlotEntry {
                    slot: slot.to_string(),
                    rooms: Vec::new(),
                });
                slots.len() - 1
            }
        };
        let rooms = &mut slots[position].rooms;
        match rooms.iter_mut().find(|(name, _)| name == room) {
            Some((_, existing)) => *existing = class,
            None => rooms.push((room.to_string(), class)),
        }
    }
}

struct SlotsView<'a>(&'a [SlotEntry]);
struct RoomsView<'a>(&'a [(String, ClassInfo)]);

impl Serialize for RoomsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (room, class) in self.0 {
            map.serialize_entry(room, class)?;
        }
        map.end()
    }
}

impl Serialize for SlotsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.slot, &RoomsView(&entry.rooms))?;
        }
        map.end()
    }
}

impl Serialize for Timetable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, slots) in &self.days {
            map.serialize_entry(day.as_str(), &SlotsView(slots))?;
        }
        map.end()
    }
}

/// Rooms mapped to `null` (as some clients send for empty rooms) are skipped.
type RawTimetable = BTreeMap<String, BTreeMap<String, BTreeMap<String, Option<ClassInfo>>>>;

impl<'de> Deserialize<'de> for Timetable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTimetable::deserialize(deserializer)?;
        let mut timetable = Timetable::default();
        for (day_label, slots) in raw {
            let day = day_label.parse::<Day>().map_err(D::Error::custom)?;
            for (slot, rooms) in slots {
                for (room, class) in rooms {
                    if let Some(class) = class {
                        timetable.insert(day, &slot, &room, class);
                    }
                }
            }
        }
        Ok(timetable)
    }
}
