//! Store boundary trait
//!
//! Abstracts the database so services can be driven by any store implementation.

use crate::domain::{
    CourseId, Grade, GradeEntry, Student, StudentGrade, StudentId, UpsertOutcome,
};

/// Persistence of courses, students and grades.
///
/// Reads are single statements. Writes run in their own transaction.
pub trait GradeStore: Send {
    /// Course names ordered by name.
    fn course_names(&self) -> rusqlite::Result<Vec<String>>;

    /// All students in storage order.
    fn students(&self) -> rusqlite::Result<Vec<Student>>;

    /// Exact-match course lookup.
    fn find_course_id(&self, course_name: &str) -> rusqlite::Result<Option<CourseId>>;

    /// Exact-match student lookup by last name; lowest id wins on duplicates.
    fn find_student_id(&self, last_name: &str) -> rusqlite::Result<Option<StudentId>>;

    /// Grade record for a (course, student) pair.
    fn find_student_grade(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> rusqlite::Result<Option<StudentGrade>>;

    /// Grade records of a course joined to their students, in record order.
    fn course_grades(&self, course_id: CourseId) -> rusqlite::Result<Vec<GradeEntry>>;

    /// Resolve names and insert or update the grade record atomically.
    fn upsert_grade(
        &mut self,
        course_name: &str,
        student_last_name: &str,
        grade: Grade,
    ) -> rusqlite::Result<UpsertOutcome>;
}
