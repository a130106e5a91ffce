//! Application services

pub mod gradebook;

pub use gradebook::GradebookService;
