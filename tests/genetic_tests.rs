use timetable_tool::solver::recommendation_for;
use timetable_tool::{
    ClassInfo, Constraints, Day, Diagnostic, FacultyInput, GeneticConfig, GeneticSolver, LabInput,
    OPTION_COUNT, RoomInput, SolverConfig, Solver, SubjectInput, TimetableRequest, evolve_options,
    validate_timetable,
};

const SLOTS: [&str; 5] = ["09:00", "10:00", "11:00", "12:00", "13:00"];

fn week() -> Vec<(&'static str, Vec<&'static str>)> {
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        .into_iter()
        .map(|day| (day, SLOTS.to_vec()))
        .collect()
}

fn request() -> TimetableRequest {
    let mut request = TimetableRequest {
        rooms: vec![RoomInput::from("R1"), RoomInput::from("R2")],
        time_slots: SLOTS.iter().map(|s| s.to_string()).collect(),
        lunch_slot: Some("12:00".into()),
        labs: vec![LabInput::new("Chem Lab", 2)],
        subjects: vec![
            SubjectInput::new("Maths", 4),
            SubjectInput::new("Physics", 3),
            SubjectInput::new("Latin", 1),
        ],
        ..TimetableRequest::default()
    };
    let availability = &mut request.faculty_availability;
    availability.insert("Chem Lab".into(), vec![FacultyInput::new("Dr.C", week())]);
    availability.insert("Maths".into(), vec![FacultyInput::new("Dr.A", week())]);
    availability.insert(
        "Physics".into(),
        vec![
            FacultyInput::new("Dr.B", week()),
            FacultyInput::new("Dr.A", week()),
        ],
    );
    request
}

fn quick_config(seed: u64) -> SolverConfig {
    SolverConfig {
        genetic: GeneticConfig {
            population_size: 20,
            generations: 15,
            seed,
            ..GeneticConfig::default()
        },
        ..SolverConfig::default()
    }
}

#[test]
fn same_seed_gives_same_options() {
    let request = request();
    let first = evolve_options(&request, &quick_config(7));
    let second = evolve_options(&request, &quick_config(7));
    assert_eq!(first, second);
}

#[test]
fn evolved_options_are_distinct_and_valid() {
    let request = request();
    let (constraints, _) = Constraints::from_request(&request);
    let response = evolve_options(&request, &quick_config(42));

    assert!(!response.options.is_empty());
    assert!(response.options.len() <= OPTION_COUNT);
    for (i, option) in response.options.iter().enumerate() {
        let fitness = option.fitness.expect("evolved options carry fitness");
        assert_eq!(option.recommendation, recommendation_for(fitness));
        assert!(option.strategy.is_none());

        let (grid, rejected) = option.timetable.to_grid(&constraints);
        assert!(rejected.is_empty());
        assert!(validate_timetable(&grid, &constraints).is_empty());
        assert_eq!(grid.count_subject("Chem Lab"), 2);
        assert!(option.timetable.is_lunch(Day::Friday, "12:00"));

        for other in &response.options[i + 1..] {
            assert_ne!(option.timetable, other.timetable);
        }
    }
    let fitness: Vec<f64> = response.options.iter().filter_map(|o| o.fitness).collect();
    assert!(fitness.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn subject_without_faculty_is_reported() {
    let response = evolve_options(&request(), &quick_config(3));
    for option in &response.options {
        assert!(option.diagnostics.contains(&Diagnostic::SubjectUnderScheduled {
            subject: "Latin".into(),
            placed: 0,
            required: 1,
        }));
    }
}

#[test]
fn nothing_to_evolve_yields_single_option() {
    let mut request = request();
    request.subjects.clear();
    let response = evolve_options(&request, &quick_config(1));
    assert_eq!(response.options.len(), 1);
    assert_eq!(response.options[0].fitness, Some(1000.0));
}

#[test]
fn solver_contract_returns_best_grid() {
    let (constraints, _) = Constraints::from_request(&request());
    let solver = GeneticSolver::new(quick_config(9).genetic, 10_000);
    assert_eq!(solver.name(), "genetic");

    let solution = solver.solve(&constraints);
    assert!(validate_timetable(&solution.grid, &constraints).is_empty());
    assert!(solution.grid.count_subject("Maths") <= 4);
    assert!(
        solution
            .grid
            .bookings()
            .all(|(_, _, booking)| booking.class != ClassInfo::lunch())
    );
}

#[test]
fn recommendation_bands() {
    assert!(recommendation_for(950.0).starts_with("Highly optimized"));
    assert!(recommendation_for(850.0).starts_with("Good optimization"));
    assert!(recommendation_for(100.0).starts_with("Meets basic requirements"));
}

#[test]
fn oversized_weekly_demand_is_capped_to_the_week() {
    let mut request = request();
    request.subjects = vec![SubjectInput {
        name: "Maths".into(),
        weekly: serde_json::json!(1.0e12),
    }];
    let config = SolverConfig {
        genetic: GeneticConfig {
            population_size: 2,
            generations: 1,
            ..GeneticConfig::default()
        },
        ..SolverConfig::default()
    };

    let response = evolve_options(&request, &config);
    assert!(!response.options.is_empty());
    let shortfall = response.options[0].diagnostics.iter().find_map(|d| match d {
        Diagnostic::SubjectUnderScheduled {
            subject,
            placed,
            required,
        } if subject == "Maths" => Some((*placed, *required)),
        _ => None,
    });
    let (placed, required) = shortfall.expect("shortfall reported");
    assert_eq!(required, 1_000_000_000_000);
    // Four teaching slots, two rooms, five days.
    assert!(placed <= 40);
}
