use crate::diagnostics::Diagnostic;
use crate::domain::Day;
use crate::grid::TimeGrid;
use crate::input::FacultyInput;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FacultyWindow {
    faculty: String,
    /// `open[day][slot]`
    open: [Vec<bool>; Day::COUNT],
}

impl FacultyWindow {
    fn new(faculty: String, slot_count: usize) -> Self {
        Self {
            faculty,
            open: std::array::from_fn(|_| vec![false; slot_count]),
        }
    }

    fn is_open(&self, day: Day, slot: usize) -> bool {
        self.open[day.index()].get(slot).copied().unwrap_or(false)
    }
}

/// Who may teach what, and when. Built once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    by_subject: HashMap<String, Vec<FacultyWindow>>,
}

impl AvailabilityIndex {
    pub(crate) fn build<F>(
        raw: &BTreeMap<String, Vec<FacultyInput>>,
        slot_count: usize,
        slot_index: F,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self
    where
        F: Fn(&str) -> Option<usize>,
    {
        let mut by_subject: HashMap<String, Vec<FacultyWindow>> = HashMap::new();
        for (subject, entries) in raw {
            let subject = subject.trim();
            if subject.is_empty() {
                diagnostics.push(Diagnostic::input_defaulted(
                    "facultyAvailability",
                    "availability without a subject name ignored",
                ));
                continue;
            }
            let windows = by_subject.entry(subject.to_string()).or_default();
            for entry in entries {
                let faculty = entry.faculty.trim();
                if faculty.is_empty() {
                    diagnostics.push(Diagnostic::input_defaulted(
                        format!("facultyAvailability.{subject}"),
                        "entry without a faculty name ignored",
                    ));
                    continue;
                }
                // Repeated faculty entries for one subject merge their windows.
                let position = match windows.iter().position(|w| w.faculty == faculty) {
                    Some(position) => position,
                    None => {
                        windows.push(FacultyWindow::new(faculty.to_string(), slot_count));
                        windows.len() - 1
                    }
                };
                for (day_label, slots) in &entry.available {
                    let Ok(day) = day_label.parse::<Day>() else {
                        diagnostics.push(Diagnostic::input_defaulted(
                            format!("facultyAvailability.{subject}.{faculty}"),
                            format!("unknown day '{day_label}' ignored"),
                        ));
                        continue;
                    };
                    for label in slots {
                        match slot_index(label) {
                            Some(slot) => windows[position].open[day.index()][slot] = true,
                            None => diagnostics.push(Diagnostic::input_defaulted(
                                format!("facultyAvailability.{subject}.{faculty}"),
                                format!("unknown slot '{label}' on {day} ignored"),
                            )),
                        }
                    }
                }
            }
        }
        Self { by_subject }
    }

    /// Faculty listed for `subject`, in input order.
    pub fn faculty_for(&self, subject: &str) -> Vec<&str> {
        self.by_subject
            .get(subject)
            .map(|windows| windows.iter().map(|w| w.faculty.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn is_available(&self, subject: &str, faculty: &str, day: Day, slot: usize) -> bool {
        self.by_subject
            .get(subject)
            .and_then(|windows| windows.iter().find(|w| w.faculty == faculty))
            .is_some_and(|window| window.is_open(day, slot))
    }

    /// Availability across the run `[start, start + len)` on one day.
    pub fn is_available_for_run(
        &self,
        subject: &str,
        faculty: &str,
        day: Day,
        start: usize,
        len: usize,
    ) -> bool {
        (start..start + len).all(|slot| self.is_available(subject, faculty, day, slot))
    }

    /// A lunch cell is never free.
    pub fn is_room_free(grid: &TimeGrid, day: Day, slot: usize, room: usize) -> bool {
        let cell = grid.cell(day, slot);
        !cell.is_lunch() && cell.occupant(room).is_none()
    }

    pub fn is_faculty_free(grid: &TimeGrid, day: Day, slot: usize, faculty: &str) -> bool {
        !grid.cell(day, slot).has_faculty(faculty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClassInfo;

    fn index() -> AvailabilityIndex {
        let slots = ["09:00", "10:00", "11:00"];
        let mut raw = BTreeMap::new();
        raw.insert(
            "Math".to_string(),
            vec![
                FacultyInput::new("Dr.A", [("Monday", vec!["09:00", "10:00"])]),
                FacultyInput::new("Dr.B", [("Tuesday", vec!["11:00"])]),
                FacultyInput::new("Dr.A", [("Friday", vec!["11:00"])]),
            ],
        );
        let mut diagnostics = Vec::new();
        let index = AvailabilityIndex::build(
            &raw,
            slots.len(),
            |label| slots.iter().position(|s| *s == label),
            &mut diagnostics,
        );
        assert!(diagnostics.is_empty());
        index
    }

    #[test]
    fn merges_repeated_faculty_entries() {
        let index = index();
        assert_eq!(index.faculty_for("Math"), vec!["Dr.A", "Dr.B"]);
        assert!(index.is_available("Math", "Dr.A", Day::Monday, 1));
        assert!(index.is_available("Math", "Dr.A", Day::Friday, 2));
        assert!(!index.is_available("Math", "Dr.B", Day::Monday, 0));
        assert!(index.faculty_for("History").is_empty());
        assert!(index.is_available_for_run("Math", "Dr.A", Day::Monday, 0, 2));
        assert!(!index.is_available_for_run("Math", "Dr.A", Day::Monday, 0, 3));
    }

    #[test]
    fn room_and_faculty_freedom_follow_grid() {
        let mut grid = TimeGrid::new(3, 2);
        grid.put(Day::Monday, 0, 1, ClassInfo::new("Math", "Dr.A"));
        assert!(AvailabilityIndex::is_room_free(&grid, Day::Monday, 0, 0));
        assert!(!AvailabilityIndex::is_room_free(&grid, Day::Monday, 0, 1));
        assert!(!AvailabilityIndex::is_faculty_free(&grid, Day::Monday, 0, "Dr.A"));
        assert!(AvailabilityIndex::is_faculty_free(&grid, Day::Monday, 1, "Dr.A"));
        grid.cell_mut(Day::Monday, 2).set_lunch(true);
        assert!(!AvailabilityIndex::is_room_free(&grid, Day::Monday, 2, 0));
    }

    #[test]
    fn subject_keys_are_trimmed() {
        let mut raw = BTreeMap::new();
        raw.insert(
            " Maths ".to_string(),
            vec![FacultyInput::new("Dr.A", [("Monday", vec!["09:00"])])],
        );
        let mut diagnostics = Vec::new();
        let index = AvailabilityIndex::build(&raw, 1, |label| (label == "09:00").then_some(0), &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(index.faculty_for("Maths"), vec!["Dr.A"]);
        assert!(index.is_available("Maths", "Dr.A", Day::Monday, 0));
    }
}
