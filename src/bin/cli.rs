use chrono::NaiveTime;
use std::io::{self, Write};
use timetable_tool::report::{faculty_load, grid_frame, render_text_table};
use timetable_tool::{
    Day, FacultyInput, FixedClassInput, LabInput, RoomInput, SolverConfig, SubjectInput,
    TimetableOption, TimetableRequest, TimetableResponse, evolve_options, generate_options,
    load_options_from_json, load_request_from_json, save_options_to_json, save_request_to_json,
    save_timetable_to_csv,
};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the current request as JSON\n  room <name>                        Add a room\n  slot <HH:MM-HH:MM>                 Append a time slot\n  lunch <slot|none>                  Set or clear the lunch slot\n  subject <name> <weekly>            Add a theory subject\n  lab <name> <duration> [preferred] [room]\n                                     Add a lab (use - to skip preferred)\n  avail <subject> <faculty> <day> <slots_csv>\n                                     Make faculty available for a subject\n  fixed <day> <slot> <room> <subject> <faculty...>\n                                     Pin a class\n  generate                           Build the three strategy options\n  evolve                             Build options with the population search\n  option <n>                         Show option n as a weekly grid\n  faculty <n>                        Show per-faculty load for option n\n  save <request|options> <path>      Write JSON to disk\n  load <request|options> <path>      Read JSON from disk\n  export <n> <csv_path>              Write option n as CSV rows\n  config show                        Show solver settings\n  config <json_path>                 Load solver settings from JSON\n  quit|exit                          Exit"
    );
}

/// Parses `HH:MM-HH:MM` and checks the range runs forward.
fn parse_slot(label: &str) -> Result<(NaiveTime, NaiveTime), String> {
    let (start, end) = label
        .split_once('-')
        .ok_or_else(|| "expected HH:MM-HH:MM".to_string())?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
        .map_err(|err| format!("bad start time '{start}': {err}"))?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
        .map_err(|err| format!("bad end time '{end}': {err}"))?;
    if start >= end {
        return Err(format!("slot must end after it starts ({label})"));
    }
    Ok((start, end))
}

fn slot_labels(request: &TimetableRequest, option: &TimetableOption) -> Vec<String> {
    if !request.time_slots.is_empty() {
        return request.time_slots.clone();
    }
    let mut labels: Vec<String> = Vec::new();
    for (_, slots) in option.timetable.days() {
        for entry in slots {
            if !labels.contains(&entry.slot) {
                labels.push(entry.slot.clone());
            }
        }
    }
    labels
}

fn option_title(index: usize, option: &TimetableOption) -> String {
    match (option.strategy, option.fitness) {
        (Some(strategy), _) => format!("Option {} ({})", index + 1, strategy),
        (None, Some(fitness)) => format!("Option {} (fitness {fitness:.1})", index + 1),
        (None, None) => format!("Option {}", index + 1),
    }
}

fn print_summary(response: &TimetableResponse) {
    for (index, option) in response.options.iter().enumerate() {
        let classes = option
            .timetable
            .entries()
            .filter(|(_, _, _, class)| !class.is_lunch_marker())
            .count();
        println!(
            "{}: {} classes, {} diagnostics\n  {}",
            option_title(index, option),
            classes,
            option.diagnostics.len(),
            option.recommendation
        );
    }
}

fn pick_option<'a>(
    response: Option<&'a TimetableResponse>,
    arg: Option<&str>,
) -> Result<(usize, &'a TimetableOption), String> {
    let response = response.ok_or_else(|| "No options yet; run generate first.".to_string())?;
    let n: usize = arg
        .ok_or_else(|| "Missing option number".to_string())?
        .parse()
        .map_err(|_| "Invalid option number".to_string())?;
    n.checked_sub(1)
        .and_then(|index| response.options.get(index).map(|option| (index, option)))
        .ok_or_else(|| format!("No option {n}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut config = match SolverConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Ignoring config: {err}");
            SolverConfig::default()
        }
    };
    let mut request = TimetableRequest::default();
    let mut response: Option<TimetableResponse> = None;

    println!("Timetable Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => match serde_json::to_string_pretty(&request) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("Error: {e}"),
            },
            "room" => match parts.next() {
                Some(name) => {
                    request.rooms.push(RoomInput::from(name));
                    println!("Room {name} added.");
                }
                None => println!("Usage: room <name>"),
            },
            "slot" => match parts.next() {
                Some(label) => match parse_slot(label) {
                    Ok(_) => {
                        request.time_slots.push(label.to_string());
                        println!("Slot {label} added.");
                    }
                    Err(e) => println!("Invalid slot: {e}"),
                },
                None => println!("Usage: slot <HH:MM-HH:MM>"),
            },
            "lunch" => match parts.next() {
                Some("none") => {
                    request.lunch_slot = None;
                    println!("Lunch cleared.");
                }
                Some(label) if request.time_slots.iter().any(|s| s == label) => {
                    request.lunch_slot = Some(label.to_string());
                    println!("Lunch set to {label}.");
                }
                Some(label) => println!("Unknown slot {label}; add it with 'slot' first."),
                None => println!("Usage: lunch <slot|none>"),
            },
            "subject" => match (parts.next(), parts.next()) {
                (Some(name), Some(weekly)) => match weekly.parse::<usize>() {
                    Ok(weekly) => {
                        request.subjects.push(SubjectInput::new(name, weekly));
                        println!("Subject {name} added ({weekly}/week).");
                    }
                    Err(_) => println!("Invalid weekly count"),
                },
                _ => println!("Usage: subject <name> <weekly>"),
            },
            "lab" => match (parts.next(), parts.next()) {
                (Some(name), Some(duration)) => match duration.parse::<usize>() {
                    Ok(duration) if duration > 0 => {
                        let mut lab = LabInput::new(name, duration);
                        lab.preferred = parts.next().filter(|p| *p != "-").map(str::to_string);
                        lab.room = parts.next().map(str::to_string);
                        request.labs.push(lab);
                        println!("Lab {name} added ({duration} slots).");
                    }
                    _ => println!("Invalid duration"),
                },
                _ => println!("Usage: lab <name> <duration> [preferred] [room]"),
            },
            "avail" => match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(subject), Some(faculty), Some(day), Some(slots)) => {
                    let day = match day.parse::<Day>() {
                        Ok(day) => day,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    let slots: Vec<String> = slots
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    let entries = request
                        .faculty_availability
                        .entry(subject.to_string())
                        .or_default();
                    match entries.iter_mut().find(|entry| entry.faculty == faculty) {
                        Some(entry) => entry
                            .available
                            .entry(day.to_string())
                            .or_default()
                            .extend(slots),
                        None => entries.push(FacultyInput::new(faculty, [(day.to_string(), slots)])),
                    }
                    println!("{faculty} available for {subject} on {day}.");
                }
                _ => println!("Usage: avail <subject> <faculty> <day> <slots_csv>"),
            },
            "fixed" => {
                let fields: Vec<&str> = parts.by_ref().take(4).collect();
                let faculty = parts.collect::<Vec<_>>().join(" ");
                if fields.len() < 4 || faculty.is_empty() {
                    println!("Usage: fixed <day> <slot> <room> <subject> <faculty...>");
                    continue;
                }
                request.fixed_classes.push(FixedClassInput {
                    day: fields[0].to_string(),
                    slot: fields[1].to_string(),
                    room: fields[2].to_string(),
                    subject: fields[3].to_string(),
                    faculty,
                });
                println!("Fixed class added.");
            }
            "generate" => {
                let generated = generate_options(&request, &config);
                print_summary(&generated);
                response = Some(generated);
            }
            "evolve" => {
                let evolved = evolve_options(&request, &config);
                if evolved.options.is_empty() {
                    println!("Population search produced no options.");
                }
                print_summary(&evolved);
                response = Some(evolved);
            }
            "option" => match pick_option(response.as_ref(), parts.next()) {
                Ok((index, option)) => {
                    let slots = slot_labels(&request, option);
                    match grid_frame(&option.timetable, &slots) {
                        Ok(df) => {
                            println!("{}\n  {}", option_title(index, option), option.recommendation);
                            println!("{}", render_text_table(&df));
                            for diagnostic in &option.diagnostics {
                                println!("  - {diagnostic}");
                            }
                        }
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Err(e) => println!("{e}"),
            },
            "faculty" => match pick_option(response.as_ref(), parts.next()) {
                Ok((_, option)) => match faculty_load(&option.timetable) {
                    Ok(df) => println!("{}", render_text_table(&df)),
                    Err(e) => println!("Error: {e}"),
                },
                Err(e) => println!("{e}"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("request"), Some(path)) => match save_request_to_json(&request, path) {
                    Ok(_) => println!("Request saved to {path}."),
                    Err(e) => println!("Save error: {e}"),
                },
                (Some("options"), Some(path)) => match response.as_ref() {
                    Some(current) => match save_options_to_json(current, path) {
                        Ok(_) => println!("Options saved to {path}."),
                        Err(e) => println!("Save error: {e}"),
                    },
                    None => println!("No options yet; run generate first."),
                },
                _ => println!("Usage: save <request|options> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("request"), Some(path)) => match load_request_from_json(path) {
                    Ok(loaded) => {
                        request = loaded;
                        response = None;
                        println!("Request loaded from {path}.");
                    }
                    Err(e) => println!("Load error: {e}"),
                },
                (Some("options"), Some(path)) => match load_options_from_json(path) {
                    Ok(loaded) => {
                        println!("Options loaded from {path}.");
                        print_summary(&loaded);
                        response = Some(loaded);
                    }
                    Err(e) => println!("Load error: {e}"),
                },
                _ => println!("Usage: load <request|options> <path>"),
            },
            "export" => {
                let picked = pick_option(response.as_ref(), parts.next());
                match (picked, parts.next()) {
                    (Ok((_, option)), Some(path)) => {
                        match save_timetable_to_csv(&option.timetable, path) {
                            Ok(_) => println!("Timetable exported to {path}."),
                            Err(e) => println!("Export error: {e}"),
                        }
                    }
                    (Err(e), _) => println!("{e}"),
                    (Ok(_), None) => println!("Usage: export <n> <csv_path>"),
                }
            }
            "config" => match parts.next() {
                Some("show") => match serde_json::to_string_pretty(&config) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {e}"),
                },
                Some(path) => match SolverConfig::from_json_file(path) {
                    Ok(loaded) => {
                        config = loaded;
                        println!("Config loaded from {path}.");
                    }
                    Err(e) => println!("Config error: {e}"),
                },
                None => println!("Usage: config <show|json_path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
