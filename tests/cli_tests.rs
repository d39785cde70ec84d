#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("TIMETABLE_TOOL_CONFIG")
        .write_stdin(script.to_string())
        .assert()
}

const SETUP: &str = "room R1\n\
slot 09:00-10:00\n\
slot 10:00-11:00\n\
slot 11:00-12:00\n\
lunch 11:00-12:00\n\
lab Optics 2 - R1\n\
avail Optics Dr.O Monday 09:00-10:00,10:00-11:00\n\
subject Maths 2\n\
avail Maths Dr.A Tuesday 09:00-10:00,10:00-11:00\n";

#[test]
fn cli_rejects_backwards_slot() {
    run_cli("slot 10:00-09:00\nquit\n")
        .success()
        .stdout(str_contains("Invalid slot: slot must end after it starts"));
}

#[test]
fn cli_lunch_requires_known_slot() {
    run_cli("lunch 12:00-13:00\nquit\n")
        .success()
        .stdout(str_contains("Unknown slot 12:00-13:00"));
}

#[test]
fn cli_generates_three_options() {
    let script = format!("{SETUP}generate\noption 1\nfaculty 1\nquit\n");
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Lab Optics added (2 slots)."));
    assert!(output.contains("Option 1 ("));
    assert!(output.contains("Option 3 ("));
    assert!(output.contains("Lunch Break"));
    assert!(output.contains("Optics (Dr.O) @R1"));
    assert!(output.contains("Dr.A"));
}

#[test]
fn cli_requires_options_before_export() {
    run_cli("export 1 out.csv\nquit\n")
        .success()
        .stdout(str_contains("No options yet; run generate first."));
}

#[test]
fn cli_exports_option_as_csv() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!("{SETUP}generate\nexport 2 {path}\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains(format!("Timetable exported to {path}.")));

    let contents = std::fs::read_to_string(tmp.path()).expect("read csv");
    assert!(contents.starts_with("day,slot,room,subject,faculty"));
    assert!(contents.contains("Monday,09:00-10:00,R1,Optics,Dr.O"));
    assert!(contents.contains("Monday,10:00-11:00,R1,Optics,Dr.O"));
}

#[test]
fn cli_save_and_load_request_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "room Persisted\nsave request {path}\nroom Temp\nload request {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Request saved to"));
    let after_reload = output
        .split("Request loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Persisted"));
    assert!(
        !after_reload.contains("Temp"),
        "temporary room should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn cli_unknown_command_hint() {
    run_cli("bogus\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}
