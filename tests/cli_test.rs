//! Tests for command dispatch output

use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use gradebook::cli::commands::{execute_command, execute_request, report, Request};
use gradebook::cli::{Cli, CliError};
use gradebook::infrastructure::di::ServiceContainer;
use gradebook::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn seeded(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("grades.db");
    testing::seed_database(
        &path,
        &["Math", "Art"],
        &[("John", "Smith"), ("Ada", "Lovelace")],
    )
    .expect("seed database");
    path
}

fn run(path: &Path, request: Request) -> String {
    let mut container = ServiceContainer::new(testing::settings_for(path)).expect("open");
    let mut out = Vec::new();
    execute_request(&mut container.gradebook, &request, &mut out).expect("execute");
    String::from_utf8(out).unwrap()
}

fn set(course: &str, last_name: &str, grade: &str) -> Request {
    Request::set_grade(Some(course), Some(last_name), Some(grade)).unwrap()
}

#[test]
fn given_c_when_executed_then_prints_courses_alphabetically() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    assert_eq!(run(&path, Request::Courses), "Art\nMath\n");
}

#[test]
fn given_s_when_executed_then_prints_first_and_last_names() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    assert_eq!(run(&path, Request::Students), "John Smith\nAda Lovelace\n");
}

#[test]
fn given_u_then_g_when_executed_then_prints_stored_grade() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    assert_eq!(run(&path, set("Math", "Smith", "90")), "");
    let lookup = Request::grades(Some("Math"), Some("Smith")).unwrap();

    assert_eq!(run(&path, lookup), "90\n");
}

#[test]
fn given_graded_course_when_g_with_course_then_prints_name_colon_grade() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);
    run(&path, set("Art", "Lovelace", "88"));
    run(&path, set("Art", "Smith", "-2"));

    let listing = run(&path, Request::grades(Some("Art"), None).unwrap());

    assert_eq!(listing, "Ada Lovelace: 88\nJohn Smith: -2\n");
}

#[test]
fn given_course_without_grades_when_g_with_course_then_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    assert_eq!(run(&path, Request::grades(Some("Math"), None).unwrap()), "");
}

#[test]
fn given_no_grade_record_when_g_with_student_then_prints_grade_not_found() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    let output = run(&path, Request::grades(Some("Math"), Some("Lovelace")).unwrap());

    assert_eq!(output, "Error: Grade not found\n");
}

#[test]
fn given_unknown_course_or_student_when_u_then_reports_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    assert_eq!(
        run(&path, set("Chemistry", "Smith", "70")),
        "Error: Course not found\n"
    );
    assert_eq!(
        run(&path, set("Math", "Hopper", "70")),
        "Error: Student not found\n"
    );
    assert_eq!(testing::count_grade_rows(&path, "Math", "Smith").unwrap(), 0);
}

#[test]
fn given_non_numeric_grade_when_u_parsed_then_invalid_input_and_no_write() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);
    let cli = Cli::try_parse_from([
        "gradebook",
        "--config",
        "/nonexistent/gradebook.toml",
        "u",
        "Math",
        "Smith",
        "ninety",
    ])
    .unwrap();

    // Argument validation happens before any config or database access.
    let err = execute_command(&cli).unwrap_err();

    assert!(matches!(err, CliError::InvalidInput(_)));
    let mut out = Vec::new();
    report(&err, &mut out);
    assert_eq!(out, b"Error: Invalid input\n");
    assert_eq!(testing::count_grade_rows(&path, "Math", "Smith").unwrap(), 0);
}

#[test]
fn given_too_few_arguments_when_executed_then_not_enough_arguments() {
    for args in [
        vec!["gradebook", "g"],
        vec!["gradebook", "u", "Math", "Smith"],
        vec!["gradebook", "u"],
    ] {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        let err = execute_command(&cli).unwrap_err();
        let mut out = Vec::new();
        report(&err, &mut out);
        assert_eq!(out, b"Error: Not enough arguments\n", "args: {:?}", args);
        assert_eq!(err.exit_code(), gradebook::exitcode::USAGE);
    }
}

#[test]
fn given_missing_config_file_when_c_executed_then_config_error() {
    let cli = Cli::try_parse_from(["gradebook", "-c", "/nonexistent/gradebook.toml", "c"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), gradebook::exitcode::CONFIG);
}

#[test]
fn given_config_file_when_init_then_creates_tables() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("data").join("fresh.db");
    let config = temp.path().join("gradebook.toml");
    std::fs::write(
        &config,
        format!("[database]\nurl = \"{}\"\n", db.display()),
    )
    .unwrap();
    let cli = Cli::try_parse_from(["gradebook", "--config", config.to_str().unwrap(), "init"])
        .unwrap();

    execute_command(&cli).unwrap();

    assert!(db.exists());
    let container = ServiceContainer::new(testing::settings_for(&db)).expect("open initialized");
    assert!(container.gradebook.get_courses().unwrap().is_empty());
}
