//! Gradebook service
//!
//! Resolves course and student names to ids and reads or writes grades through a [`GradeStore`].

use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, QueryResultExt};
use crate::domain::{
    CourseId, Grade, GradeEntry, StudentGradeId, StudentId, StudentName, UpsertOutcome,
};
use crate::infrastructure::traits::GradeStore;

/// Service for querying and updating grades.
pub struct GradebookService {
    store: Box<dyn GradeStore>,
}

impl GradebookService {
    /// Create a new gradebook service over an opened store.
    pub fn new(store: Box<dyn GradeStore>) -> Self {
        Self { store }
    }

    /// All course names, alphabetically.
    #[instrument(skip(self))]
    pub fn get_courses(&self) -> ApplicationResult<Vec<String>> {
        let courses = self
            .store
            .course_names()
            .with_query_context("list courses", "")?;
        debug!("get_courses: {} courses", courses.len());
        Ok(courses)
    }

    /// All students in storage order.
    #[instrument(skip(self))]
    pub fn get_students(&self) -> ApplicationResult<Vec<StudentName>> {
        let students = self
            .store
            .students()
            .with_query_context("list students", "")?;
        debug!("get_students: {} students", students.len());
        Ok(students.iter().map(|s| s.name()).collect())
    }

    /// Id of the course with exactly this name.
    #[instrument(skip(self))]
    pub fn get_course_id(&self, course_name: &str) -> ApplicationResult<Option<CourseId>> {
        self.store
            .find_course_id(course_name)
            .with_query_context("lookup course", course_name)
    }

    /// Id of the first student with exactly this last name.
    #[instrument(skip(self))]
    pub fn get_student_id(&self, last_name: &str) -> ApplicationResult<Option<StudentId>> {
        self.store
            .find_student_id(last_name)
            .with_query_context("lookup student", last_name)
    }

    /// Id of the grade record for a (course, student) pair.
    #[instrument(skip(self))]
    pub fn get_student_grade_id(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> ApplicationResult<Option<StudentGradeId>> {
        let record = self
            .store
            .find_student_grade(course_id, student_id)
            .with_query_context(
                "lookup grade record",
                &format!("course={course_id} student={student_id}"),
            )?;
        Ok(record.map(|r| r.student_grade_id))
    }

    /// Students holding a grade in the course, with that grade.
    ///
    /// An unknown course yields an empty list.
    #[instrument(skip(self))]
    pub fn get_students_for_course(&self, course_name: &str) -> ApplicationResult<Vec<GradeEntry>> {
        let Some(course_id) = self.get_course_id(course_name)? else {
            debug!("get_students_for_course: unknown course {:?}", course_name);
            return Ok(Vec::new());
        };
        self.store
            .course_grades(course_id)
            .with_query_context("list grades for course", course_name)
    }

    /// Grade of a student in a course.
    ///
    /// `None` when the course, the student or the grade record does not exist.
    #[instrument(skip(self))]
    pub fn get_grade(
        &self,
        course_name: &str,
        student_last_name: &str,
    ) -> ApplicationResult<Option<Grade>> {
        let Some(course_id) = self.get_course_id(course_name)? else {
            return Ok(None);
        };
        let Some(student_id) = self.get_student_id(student_last_name)? else {
            return Ok(None);
        };
        let record = self
            .store
            .find_student_grade(course_id, student_id)
            .with_query_context(
                "lookup grade",
                &format!("{course_name}/{student_last_name}"),
            )?;
        Ok(record.map(|r| r.grade))
    }

    /// Set a student's grade in a course, inserting the record if absent.
    ///
    /// Name resolution, the existence check and the write happen in one store transaction.
    #[instrument(skip(self))]
    pub fn set_grade(
        &mut self,
        course_name: &str,
        student_last_name: &str,
        grade: Grade,
    ) -> ApplicationResult<UpsertOutcome> {
        let outcome = self
            .store
            .upsert_grade(course_name, student_last_name, grade)
            .with_query_context(
                "set grade",
                &format!("{course_name}/{student_last_name}"),
            )?;
        match &outcome {
            UpsertOutcome::Inserted { student_grade_id } => {
                info!("inserted grade record {}: {}", student_grade_id, grade)
            }
            UpsertOutcome::Updated {
                student_grade_id,
                previous,
            } => info!(
                "updated grade record {}: {} -> {}",
                student_grade_id, previous, grade
            ),
            UpsertOutcome::CourseNotFound => debug!("set_grade: unknown course {:?}", course_name),
            UpsertOutcome::StudentNotFound => {
                debug!("set_grade: unknown student {:?}", student_last_name)
            }
        }
        Ok(outcome)
    }
}
