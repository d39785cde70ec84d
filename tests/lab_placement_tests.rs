use timetable_tool::placement::{lab_candidates, place_labs};
use timetable_tool::{
    ClassInfo, Constraints, Day, Diagnostic, FacultyInput, LabInput, RoomInput, SolverConfig,
    Solver, Strategy, StrategySolver, TimeGrid, TimetableRequest, generate_options,
    normalize_lunch, validate_timetable,
};

fn request(rooms: &[&str], slots: &[&str], labs: Vec<LabInput>) -> TimetableRequest {
    TimetableRequest {
        rooms: rooms.iter().map(|r| RoomInput::from(*r)).collect(),
        time_slots: slots.iter().map(|s| s.to_string()).collect(),
        labs,
        ..TimetableRequest::default()
    }
}

fn available(request: &mut TimetableRequest, lab: &str, faculty: &str, day: &str, slots: &[&str]) {
    request
        .faculty_availability
        .entry(lab.to_string())
        .or_default()
        .push(FacultyInput::new(faculty, [(day, slots.to_vec())]));
}

fn empty_grid(constraints: &Constraints) -> TimeGrid {
    let mut grid = TimeGrid::new(constraints.slots().len(), constraints.rooms().len());
    normalize_lunch(&mut grid, constraints.lunch_slot());
    grid
}

const FOUR: [&str; 4] = ["09:00", "10:00", "11:00", "12:00"];

/// Alpha's first fit blocks Beta, so the search must move Alpha later.
fn blocking_pair() -> TimetableRequest {
    let mut req = request(
        &["R1"],
        &FOUR,
        vec![LabInput::new("Alpha", 2), LabInput::new("Beta", 2)],
    );
    available(&mut req, "Alpha", "Dr.A", "Monday", &FOUR);
    available(&mut req, "Beta", "Dr.B", "Monday", &["09:00", "10:00"]);
    req
}

#[test]
fn backtracking_moves_earlier_lab_out_of_the_way() {
    let (constraints, _) = Constraints::from_request(&blocking_pair());
    let mut grid = empty_grid(&constraints);
    let outcome = place_labs(&mut grid, &constraints, Strategy::Balanced, 10_000);

    assert!(outcome.unplaced.is_empty());
    assert!(!outcome.budget_exhausted);
    let alpha = ClassInfo::new("Alpha", "Dr.A");
    let beta = ClassInfo::new("Beta", "Dr.B");
    assert_eq!(grid.occupant(Day::Monday, 0, 0), Some(&beta));
    assert_eq!(grid.occupant(Day::Monday, 1, 0), Some(&beta));
    assert_eq!(grid.occupant(Day::Monday, 2, 0), Some(&alpha));
    assert_eq!(grid.occupant(Day::Monday, 3, 0), Some(&alpha));
    assert!(validate_timetable(&grid, &constraints).is_empty());
}

#[test]
fn exhausted_budget_keeps_partial_result_and_reports_it() {
    let (constraints, _) = Constraints::from_request(&blocking_pair());
    let solution = StrategySolver::new(Strategy::Balanced, 1, 1).solve(&constraints);

    assert!(
        solution
            .diagnostics
            .contains(&Diagnostic::SearchBudgetExhausted { explored: 1 })
    );
    assert!(solution.diagnostics.contains(&Diagnostic::LabUnplaced {
        lab: "Beta".into(),
        duration: 2,
    }));
    assert_eq!(solution.grid.count_subject("Alpha"), 2);
    assert_eq!(solution.grid.count_subject("Beta"), 0);
    assert!(validate_timetable(&solution.grid, &constraints).is_empty());
}

#[test]
fn driver_honours_configured_budget() {
    let config = SolverConfig {
        search_budget: 1,
        ..SolverConfig::default()
    };
    for option in generate_options(&blocking_pair(), &config).options {
        assert!(
            option
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::SearchBudgetExhausted { .. }))
        );
    }
}

#[test]
fn longest_lab_is_placed_first() {
    let mut req = request(
        &["R1"],
        &FOUR,
        vec![LabInput::new("Short", 1), LabInput::new("Long", 3)],
    );
    available(&mut req, "Short", "Dr.S", "Monday", &FOUR);
    available(&mut req, "Long", "Dr.L", "Monday", &FOUR);
    let (constraints, _) = Constraints::from_request(&req);
    let mut grid = empty_grid(&constraints);

    let outcome = place_labs(&mut grid, &constraints, Strategy::Balanced, 10_000);
    assert_eq!(outcome.placed.len(), 2);
    assert_eq!(outcome.placed[0].0, 1);
    assert_eq!(outcome.placed[0].1.start, 0);
    assert_eq!(outcome.placed[1].1.start, 3);
}

#[test]
fn preferred_start_is_tried_first() {
    let mut lab = LabInput::new("Optics", 2);
    lab.preferred = Some("11:00".into());
    let mut req = request(&["R1", "R2"], &FOUR, vec![lab]);
    available(&mut req, "Optics", "Dr.O", "Monday", &FOUR);
    available(&mut req, "Optics", "Dr.O", "Tuesday", &FOUR);
    let (constraints, _) = Constraints::from_request(&req);
    let grid = empty_grid(&constraints);

    for strategy in Strategy::ALL {
        let candidates = lab_candidates(&grid, &constraints, strategy, &constraints.labs()[0]);
        assert_eq!(candidates[0].start, 2, "{strategy}");
        assert_eq!(candidates[0].day, Day::Monday);
    }
}

#[test]
fn mandatory_room_restricts_candidates() {
    let mut lab = LabInput::new("Robotics", 2);
    lab.room = Some("R2".into());
    let mut req = request(&["R1", "R2"], &FOUR, vec![lab]);
    available(&mut req, "Robotics", "Dr.R", "Friday", &FOUR);
    let (constraints, _) = Constraints::from_request(&req);
    let grid = empty_grid(&constraints);

    let candidates = lab_candidates(&grid, &constraints, Strategy::Balanced, &constraints.labs()[0]);
    assert!(!candidates.is_empty());
    assert!(candidates.iter().all(|c| c.room == 1 && c.day == Day::Friday));
}

#[test]
fn windows_never_span_lunch() {
    let mut req = request(&["R1"], &FOUR, vec![LabInput::new("Geo Lab", 2)]);
    req.lunch_slot = Some("10:00".into());
    available(&mut req, "Geo Lab", "Dr.G", "Monday", &FOUR);
    let (constraints, _) = Constraints::from_request(&req);
    let grid = empty_grid(&constraints);

    let candidates = lab_candidates(&grid, &constraints, Strategy::LabGrouping, &constraints.labs()[0]);
    let starts: Vec<usize> = candidates.iter().map(|c| c.start).collect();
    assert_eq!(starts, vec![2]);
}

#[test]
fn faculty_must_cover_the_whole_run() {
    let mut req = request(&["R1"], &FOUR, vec![LabInput::new("Bio Lab", 3)]);
    available(&mut req, "Bio Lab", "Dr.Part", "Monday", &["09:00", "10:00"]);
    available(&mut req, "Bio Lab", "Dr.Full", "Monday", &["10:00", "11:00", "12:00"]);
    let (constraints, _) = Constraints::from_request(&req);
    let grid = empty_grid(&constraints);

    let candidates = lab_candidates(&grid, &constraints, Strategy::Balanced, &constraints.labs()[0]);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].faculty, "Dr.Full");
    assert_eq!(candidates[0].start, 1);
}

#[test]
fn lab_without_faculty_does_not_drain_the_search() {
    let slots = [
        "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00",
    ];
    let mut labs: Vec<LabInput> = (1..=5).map(|n| LabInput::new(format!("Lab{n}"), 2)).collect();
    labs.push(LabInput::new("NoTeacher", 2));
    let mut req = request(&["R1", "R2", "R3", "R4"], &slots, labs);
    for n in 1..=5 {
        for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] {
            available(&mut req, &format!("Lab{n}"), &format!("Dr.{n}"), day, &slots);
        }
    }
    let config = SolverConfig {
        search_budget: 50,
        ..SolverConfig::default()
    };

    for option in generate_options(&req, &config).options {
        assert!(
            !option
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::SearchBudgetExhausted { .. })),
            "{:?}",
            option.diagnostics
        );
        assert!(option.diagnostics.contains(&Diagnostic::LabUnplaced {
            lab: "NoTeacher".into(),
            duration: 2,
        }));
        for n in 1..=5 {
            assert_eq!(option.timetable.count_subject(&format!("Lab{n}")), 2);
        }
    }
}
