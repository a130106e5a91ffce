//! Domain entities: core data structures

use std::fmt;

use crate::domain::DomainError;

/// Row id of a course.
pub type CourseId = i64;
/// Row id of a student.
pub type StudentId = i64;
/// Row id of a grade record.
pub type StudentGradeId = i64;
/// Integer grade as stored in `student_grade.grade`.
pub type Grade = i32;

/// A course offered; `course_name` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub course_id: CourseId,
    pub course_name: String,
}

/// A student record. Looked up by `last_name`, which the schema does not keep unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn name(&self) -> StudentName {
        StudentName::new(&self.first_name, &self.last_name)
    }
}

/// One grade for a (course, student) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentGrade {
    pub student_grade_id: StudentGradeId,
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub grade: Grade,
}

/// Display name of a student, rendered as `First Last`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentName {
    pub first_name: String,
    pub last_name: String,
}

impl StudentName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl fmt::Display for StudentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A student together with their grade in one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeEntry {
    pub student: StudentName,
    pub grade: Grade,
}

impl fmt::Display for GradeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.student, self.grade)
    }
}

/// Result of setting a grade.
///
/// `CourseNotFound` and `StudentNotFound` mean nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted {
        student_grade_id: StudentGradeId,
    },
    Updated {
        student_grade_id: StudentGradeId,
        previous: Grade,
    },
    CourseNotFound,
    StudentNotFound,
}

impl UpsertOutcome {
    /// Whether a grade row was written.
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Inserted { .. } | Self::Updated { .. })
    }
}

/// Parse a grade given on the command line.
///
/// Only plain integers are accepted (an optional sign, no whitespace).
pub fn parse_grade(input: &str) -> Result<Grade, DomainError> {
    input
        .parse::<Grade>()
        .map_err(|_| DomainError::InvalidGrade(input.to_string()))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Unresolvable variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
