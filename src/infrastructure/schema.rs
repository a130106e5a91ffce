//! Table layout and typed row access
//!
//! Three tables back the record kinds:
//! - `course(course_id, course_name)`
//! - `student(student_id, first_name, last_name)`
//! - `student_grade(student_grade_id, course_id, student_id, grade)`
//!
//! One grade row per (course_id, student_id) is kept by the store's write transaction;
//! the schema only indexes the pair.

use rusqlite::{Connection, Row};

use crate::domain::{Course, GradeEntry, Student, StudentGrade, StudentName};

pub const COURSE_TABLE: &str = "course";
pub const STUDENT_TABLE: &str = "student";
pub const STUDENT_GRADE_TABLE: &str = "student_grade";

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS course (
    course_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    course_name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS student (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS student_grade (
    student_grade_id INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id        INTEGER NOT NULL REFERENCES course(course_id),
    student_id       INTEGER NOT NULL REFERENCES student(student_id),
    grade            INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS student_grade_course_student
    ON student_grade(course_id, student_id);
";

/// Create the tables and the pair index if they do not exist.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}

/// Names of the gradebook tables present in the database.
pub fn existing_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2, ?3) ORDER BY name",
    )?;
    let names = stmt
        .query_map([COURSE_TABLE, STUDENT_TABLE, STUDENT_GRADE_TABLE], |row| {
            row.get(0)
        })?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

pub fn map_course_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        course_id: row.get("course_id")?,
        course_name: row.get("course_name")?,
    })
}

pub fn map_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: row.get("student_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
    })
}

pub fn map_student_grade_row(row: &Row<'_>) -> rusqlite::Result<StudentGrade> {
    Ok(StudentGrade {
        student_grade_id: row.get("student_grade_id")?,
        course_id: row.get("course_id")?,
        student_id: row.get("student_id")?,
        grade: row.get("grade")?,
    })
}

/// Map a `student_grade` row joined with its `student` row.
pub fn map_grade_entry_row(row: &Row<'_>) -> rusqlite::Result<GradeEntry> {
    Ok(GradeEntry {
        student: StudentName::new(
            row.get::<_, String>("first_name")?,
            row.get::<_, String>("last_name")?,
        ),
        grade: row.get("grade")?,
    })
}
