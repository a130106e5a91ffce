//! Command dispatch
//!
//! Turns parsed arguments into gradebook requests and prints their results.

use std::fmt::Display;
use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::GradebookService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{parse_grade, Grade, UpsertOutcome};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, OpenMode, SqliteStore};

pub const GRADE_NOT_FOUND: &str = "Error: Grade not found";
pub const COURSE_NOT_FOUND: &str = "Error: Course not found";
pub const STUDENT_NOT_FOUND: &str = "Error: Student not found";

/// A validated gradebook command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `c`
    Courses,
    /// `s`
    Students,
    /// `g <course>`
    CourseGrades { course: String },
    /// `g <course> <lastName>`
    Grade { course: String, last_name: String },
    /// `u <course> <lastName> <grade>`
    SetGrade {
        course: String,
        last_name: String,
        grade: Grade,
    },
}

impl Request {
    /// Build the `g` request; one argument lists the course, two look up a single grade.
    pub fn grades(course: Option<&str>, last_name: Option<&str>) -> CliResult<Self> {
        let course = course.ok_or_else(CliError::not_enough_arguments)?;
        Ok(match last_name {
            None => Request::CourseGrades {
                course: course.to_string(),
            },
            Some(last_name) => Request::Grade {
                course: course.to_string(),
                last_name: last_name.to_string(),
            },
        })
    }

    /// Build the `u` request. The grade must be an integer.
    pub fn set_grade(
        course: Option<&str>,
        last_name: Option<&str>,
        grade: Option<&str>,
    ) -> CliResult<Self> {
        let (Some(course), Some(last_name), Some(grade)) = (course, last_name, grade) else {
            return Err(CliError::not_enough_arguments());
        };
        let grade = parse_grade(grade).map_err(CliError::InvalidInput)?;
        Ok(Request::SetGrade {
            course: course.to_string(),
            last_name: last_name.to_string(),
            grade,
        })
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::not_enough_arguments());
    };
    match command {
        Commands::Courses => run_request(cli, Request::Courses),
        Commands::Students => run_request(cli, Request::Students),
        Commands::Grades { course, last_name } => run_request(
            cli,
            Request::grades(course.as_deref(), last_name.as_deref())?,
        ),
        Commands::Update {
            course,
            last_name,
            grade,
        } => run_request(
            cli,
            Request::set_grade(course.as_deref(), last_name.as_deref(), grade.as_deref())?,
        ),
        Commands::Init => _init(cli),
        Commands::Config { command } => _config(cli, command),
        Commands::Completion { shell } => _completion(*shell),
    }
}

/// Open the configured database and run one request against it, printing to stdout.
fn run_request(cli: &Cli, request: Request) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let mut container = ServiceContainer::new(settings)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_request(&mut container.gradebook, &request, &mut out)
}

/// Run a request and write its output lines.
#[instrument(skip(service, out))]
pub fn execute_request(
    service: &mut GradebookService,
    request: &Request,
    out: &mut dyn Write,
) -> CliResult<()> {
    match request {
        Request::Courses => {
            for course in service.get_courses()? {
                emit(out, course)?;
            }
        }
        Request::Students => {
            for student in service.get_students()? {
                emit(out, student)?;
            }
        }
        Request::CourseGrades { course } => {
            for entry in service.get_students_for_course(course)? {
                emit(out, entry)?;
            }
        }
        Request::Grade { course, last_name } => match service.get_grade(course, last_name)? {
            Some(grade) => emit(out, grade)?,
            None => emit(out, GRADE_NOT_FOUND)?,
        },
        Request::SetGrade {
            course,
            last_name,
            grade,
        } => match service.set_grade(course, last_name, *grade)? {
            UpsertOutcome::CourseNotFound => emit(out, COURSE_NOT_FOUND)?,
            UpsertOutcome::StudentNotFound => emit(out, STUDENT_NOT_FOUND)?,
            outcome => debug!("set grade: written={} {:?}", outcome.is_written(), outcome),
        },
    }
    Ok(())
}

/// Print a failed command's error.
///
/// Argument errors are part of the command's regular output: a plain `Error: <msg>` line on
/// `out`. Everything else goes to stderr with the colored prefix.
pub fn report(err: &CliError, out: &mut dyn Write) {
    if err.is_argument_error() {
        if writeln!(out, "Error: {}", err).and_then(|_| out.flush()).is_ok() {
            return;
        }
    }
    output::error(err);
}

fn emit(out: &mut dyn Write, line: impl Display) -> CliResult<()> {
    writeln!(out, "{}", line).map_err(|e| CliError::from(InfraError::io("write output", e)))
}

#[instrument(skip(cli))]
fn _init(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let store = SqliteStore::open(&settings.database, OpenMode::CreateIfMissing)?;
    store.create_tables()?;
    output::success(&format!("Initialized database: {}", settings.database.url));
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("Global", &format!("{}{}", path.display(), state));
                }
                None => output::warning("cannot determine global config directory"),
            }
            if let Some(path) = &cli.config {
                output::action("Explicit", &path.display());
            }
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine global config directory".to_string())
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use clap::Parser;

    fn command(args: &[&str]) -> Commands {
        Cli::try_parse_from(args)
            .expect("parse args")
            .command
            .expect("subcommand")
    }

    #[test]
    fn given_g_without_course_when_building_request_then_not_enough_arguments() {
        let err = Request::grades(None, None).unwrap_err();
        assert_eq!(err.to_string(), "Not enough arguments");
    }

    #[test]
    fn given_g_with_course_only_when_building_request_then_lists_course() {
        assert_eq!(
            Request::grades(Some("Math"), None).unwrap(),
            Request::CourseGrades {
                course: "Math".into()
            }
        );
    }

    #[test]
    fn given_u_with_missing_grade_when_building_request_then_not_enough_arguments() {
        let err = Request::set_grade(Some("Math"), Some("Smith"), None).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn given_u_with_text_grade_when_building_request_then_invalid_input() {
        let err = Request::set_grade(Some("Math"), Some("Smith"), Some("A")).unwrap_err();
        assert!(matches!(
            err,
            CliError::InvalidInput(DomainError::InvalidGrade(ref s)) if s == "A"
        ));
    }

    #[test]
    fn given_argument_errors_when_reported_then_plain_error_line_on_output() {
        colored::control::set_override(true);
        for (err, expected) in [
            (
                CliError::InvalidInput(DomainError::InvalidGrade("A".into())),
                "Error: Invalid input\n",
            ),
            (CliError::not_enough_arguments(), "Error: Not enough arguments\n"),
        ] {
            let mut out = Vec::new();
            report(&err, &mut out);
            assert_eq!(String::from_utf8(out).unwrap(), expected);
        }
        colored::control::unset_override();
    }

    #[test]
    fn given_database_error_when_reported_then_nothing_on_output() {
        let err = CliError::from(InfraError::NotInitialized("grades.db".into()));
        let mut out = Vec::new();

        report(&err, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn given_negative_grade_argument_when_parsed_then_accepted_as_positional() {
        match command(&["gradebook", "u", "Math", "Smith", "-5"]) {
            Commands::Update { grade, .. } => assert_eq!(grade.as_deref(), Some("-5")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn given_hyphenated_names_when_parsed_then_taken_as_positionals() {
        match command(&["gradebook", "u", "-Math", "Smith", "5"]) {
            Commands::Update {
                course, last_name, ..
            } => {
                assert_eq!(course.as_deref(), Some("-Math"));
                assert_eq!(last_name.as_deref(), Some("Smith"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        match command(&["gradebook", "g", "Math", "-d"]) {
            Commands::Grades { last_name, .. } => assert_eq!(last_name.as_deref(), Some("-d")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn given_debug_flag_before_positionals_when_parsed_then_counts_as_flag() {
        let cli = Cli::try_parse_from(["gradebook", "-d", "g", "Math"]).unwrap();
        assert_eq!(cli.debug, 1);
        let cli = Cli::try_parse_from(["gradebook", "g", "-d", "Math"]).unwrap();
        assert_eq!(cli.debug, 1);
        assert!(matches!(
            cli.command,
            Some(Commands::Grades { last_name: None, .. })
        ));
    }

    #[test]
    fn given_single_letter_commands_when_parsed_then_map_to_variants() {
        assert!(matches!(command(&["gradebook", "c"]), Commands::Courses));
        assert!(matches!(command(&["gradebook", "s"]), Commands::Students));
        assert!(matches!(
            command(&["gradebook", "g", "Math"]),
            Commands::Grades { last_name: None, .. }
        ));
    }

    #[test]
    fn given_no_subcommand_when_execute_then_not_enough_arguments() {
        let cli = Cli::try_parse_from(["gradebook"]).unwrap();
        let err = execute_command(&cli).unwrap_err();
        assert_eq!(err.to_string(), "Not enough arguments");
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }
}
