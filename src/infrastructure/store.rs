//! SQLite implementation of [`GradeStore`].

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use tracing::{debug, instrument};

use crate::config::DatabaseConfig;
use crate::domain::{
    CourseId, Grade, GradeEntry, Student, StudentGrade, StudentId, UpsertOutcome,
};
use crate::infrastructure::schema;
use crate::infrastructure::traits::GradeStore;
use crate::infrastructure::{InfraError, InfraResult};

/// How to treat a database that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Fail unless the database exists and holds the gradebook tables.
    Existing,
    /// Create the database file if it is missing.
    CreateIfMissing,
}

/// SQLite-backed grade store.
///
/// Owns the connection for the lifetime of the process; dropping it closes the database.
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open the database named by `config.url`.
    #[instrument(level = "debug")]
    pub fn open(config: &DatabaseConfig, mode: OpenMode) -> InfraResult<Self> {
        let target = database_target(&config.url);
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if mode == OpenMode::CreateIfMissing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
            ensure_parent_dir(target)?;
        }
        debug!("open: target={} mode={:?}", target, mode);

        let conn = Connection::open_with_flags(target, flags)
            .map_err(|e| InfraError::database(format!("open {}", config.url), e))?;
        apply_pragmas(&conn, Duration::from_millis(config.busy_timeout_ms))?;

        let store = Self { conn };
        if mode == OpenMode::Existing && !store.is_initialized()? {
            return Err(InfraError::NotInitialized(config.url.clone()));
        }
        Ok(store)
    }

    /// Open a private in-memory database with the tables created.
    pub fn open_in_memory() -> InfraResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| InfraError::database("open in-memory database", e))?;
        apply_pragmas(&conn, Duration::from_millis(0))?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Create the gradebook tables if they do not exist.
    pub fn create_tables(&self) -> InfraResult<()> {
        schema::create_tables(&self.conn).map_err(|e| InfraError::database("create tables", e))
    }

    /// Whether all gradebook tables are present.
    pub fn is_initialized(&self) -> InfraResult<bool> {
        let tables = schema::existing_tables(&self.conn)
            .map_err(|e| InfraError::database("inspect schema", e))?;
        Ok(tables.len() == 3)
    }
}

/// Strip an optional `sqlite://` scheme; `file:` URIs and plain paths pass through.
fn database_target(url: &str) -> &str {
    url.strip_prefix("sqlite://").unwrap_or(url)
}

fn ensure_parent_dir(target: &str) -> InfraResult<()> {
    if target == ":memory:" || target.starts_with("file:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(target)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    Ok(())
}

fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> InfraResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| InfraError::database("enable foreign keys", e))?;
    conn.busy_timeout(busy_timeout)
        .map_err(|e| InfraError::database("set busy timeout", e))?;
    Ok(())
}

fn find_course_id(conn: &Connection, course_name: &str) -> rusqlite::Result<Option<CourseId>> {
    conn.prepare_cached(
        "SELECT course_id FROM course WHERE course_name = ?1 ORDER BY course_id LIMIT 1",
    )?
    .query_row(params![course_name], |row| row.get(0))
    .optional()
}

fn find_student_id(conn: &Connection, last_name: &str) -> rusqlite::Result<Option<StudentId>> {
    conn.prepare_cached(
        "SELECT student_id FROM student WHERE last_name = ?1 ORDER BY student_id LIMIT 1",
    )?
    .query_row(params![last_name], |row| row.get(0))
    .optional()
}

fn find_student_grade(
    conn: &Connection,
    course_id: CourseId,
    student_id: StudentId,
) -> rusqlite::Result<Option<StudentGrade>> {
    conn.prepare_cached(
        "SELECT student_grade_id, course_id, student_id, grade FROM student_grade
         WHERE course_id = ?1 AND student_id = ?2
         ORDER BY student_grade_id LIMIT 1",
    )?
    .query_row(params![course_id, student_id], schema::map_student_grade_row)
    .optional()
}

impl GradeStore for SqliteStore {
    fn course_names(&self) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT course_id, course_name FROM course ORDER BY course_name")?;
        let names = stmt
            .query_map([], schema::map_course_row)?
            .map(|course| course.map(|c| c.course_name))
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn students(&self) -> rusqlite::Result<Vec<Student>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT student_id, first_name, last_name FROM student ORDER BY student_id",
        )?;
        let students = stmt
            .query_map([], schema::map_student_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(students)
    }

    fn find_course_id(&self, course_name: &str) -> rusqlite::Result<Option<CourseId>> {
        debug!("find_course_id: {:?}", course_name);
        find_course_id(&self.conn, course_name)
    }

    fn find_student_id(&self, last_name: &str) -> rusqlite::Result<Option<StudentId>> {
        debug!("find_student_id: {:?}", last_name);
        find_student_id(&self.conn, last_name)
    }

    fn find_student_grade(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> rusqlite::Result<Option<StudentGrade>> {
        debug!(
            "find_student_grade: course={} student={}",
            course_id, student_id
        );
        find_student_grade(&self.conn, course_id, student_id)
    }

    fn course_grades(&self, course_id: CourseId) -> rusqlite::Result<Vec<GradeEntry>> {
        debug!("course_grades: course={}", course_id);
        let mut stmt = self.conn.prepare_cached(
            "SELECT s.first_name, s.last_name, g.grade
             FROM student_grade g
             JOIN student s ON s.student_id = g.student_id
             WHERE g.course_id = ?1
             ORDER BY g.student_grade_id",
        )?;
        let entries = stmt
            .query_map(params![course_id], schema::map_grade_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn upsert_grade(
        &mut self,
        course_name: &str,
        student_last_name: &str,
        grade: Grade,
    ) -> rusqlite::Result<UpsertOutcome> {
        // IMMEDIATE takes the write lock up front, so no other writer can slip
        // a row in between the existence check and the insert.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(course_id) = find_course_id(&tx, course_name)? else {
            return Ok(UpsertOutcome::CourseNotFound);
        };
        let Some(student_id) = find_student_id(&tx, student_last_name)? else {
            return Ok(UpsertOutcome::StudentNotFound);
        };

        let outcome = match find_student_grade(&tx, course_id, student_id)? {
            None => {
                tx.prepare_cached(
                    "INSERT INTO student_grade (course_id, student_id, grade) VALUES (?1, ?2, ?3)",
                )?
                .execute(params![course_id, student_id, grade])?;
                UpsertOutcome::Inserted {
                    student_grade_id: tx.last_insert_rowid(),
                }
            }
            Some(existing) => {
                tx.prepare_cached("UPDATE student_grade SET grade = ?1 WHERE student_grade_id = ?2")?
                    .execute(params![grade, existing.student_grade_id])?;
                UpsertOutcome::Updated {
                    student_grade_id: existing.student_grade_id,
                    previous: existing.grade,
                }
            }
        };
        tx.commit()?;
        debug!("upsert_grade: {:?}", outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "INSERT INTO course (course_name) VALUES ('Math'), ('Art');
                 INSERT INTO student (first_name, last_name) VALUES ('John', 'Smith'), ('Jane', 'Smith');",
            )
            .unwrap();
        store
    }

    #[test]
    fn given_scheme_prefix_when_database_target_then_strips_it() {
        assert_eq!(database_target("sqlite:///tmp/g.db"), "/tmp/g.db");
        assert_eq!(database_target("file:g.db?mode=ro"), "file:g.db?mode=ro");
        assert_eq!(database_target("g.db"), "g.db");
    }

    #[test]
    fn given_duplicate_last_names_when_find_student_id_then_lowest_id_wins() {
        let store = seeded();
        assert_eq!(store.find_student_id("Smith").unwrap(), Some(1));
    }

    #[test]
    fn given_unknown_student_when_upsert_then_nothing_written() {
        let mut store = seeded();
        let outcome = store.upsert_grade("Math", "Nobody", 70).unwrap();
        assert_eq!(outcome, UpsertOutcome::StudentNotFound);

        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM student_grade", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn given_existing_grade_when_upsert_then_reports_previous_value() {
        let mut store = seeded();
        let first = store.upsert_grade("Art", "Smith", 60).unwrap();
        let second = store.upsert_grade("Art", "Smith", 75).unwrap();

        assert_eq!(first, UpsertOutcome::Inserted { student_grade_id: 1 });
        assert_eq!(
            second,
            UpsertOutcome::Updated {
                student_grade_id: 1,
                previous: 60
            }
        );
    }
}
