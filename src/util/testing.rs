//! Shared test setup: logging and seeded databases

use std::env;
use std::path::Path;
use std::sync::Once;

use rusqlite::{params, Connection};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{DatabaseConfig, Settings};
use crate::infrastructure::schema;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Create the gradebook tables at `path` and insert courses and students.
///
/// Students are `(first_name, last_name)` pairs; ids follow slice order starting at 1.
pub fn seed_database(
    path: &Path,
    courses: &[&str],
    students: &[(&str, &str)],
) -> rusqlite::Result<()> {
    let mut conn = Connection::open(path)?;
    schema::create_tables(&conn)?;
    let tx = conn.transaction()?;
    for course in courses {
        tx.execute(
            "INSERT INTO course (course_name) VALUES (?1)",
            params![course],
        )?;
    }
    for (first_name, last_name) in students {
        tx.execute(
            "INSERT INTO student (first_name, last_name) VALUES (?1, ?2)",
            params![first_name, last_name],
        )?;
    }
    tx.commit()
}

/// Number of grade rows for a (course name, student last name) pair, read with a fresh connection.
pub fn count_grade_rows(path: &Path, course: &str, last_name: &str) -> rusqlite::Result<i64> {
    let conn = Connection::open(path)?;
    conn.query_row(
        "SELECT COUNT(*) FROM student_grade g
         JOIN course c ON c.course_id = g.course_id
         JOIN student s ON s.student_id = g.student_id
         WHERE c.course_name = ?1 AND s.last_name = ?2",
        params![course, last_name],
        |row| row.get(0),
    )
}

/// Settings pointing at a database file.
pub fn settings_for(path: &Path) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: path.to_string_lossy().into_owned(),
            busy_timeout_ms: 1000,
        },
    }
}
