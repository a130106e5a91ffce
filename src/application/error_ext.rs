//! Error conversion helpers for store queries
//!
//! Provides an extension trait that attaches the query and its key to a database error.

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `rusqlite::Result` to `ApplicationResult` with context.
pub trait QueryResultExt<T> {
    /// Add query context to a database error.
    ///
    /// # Example
    /// ```ignore
    /// store.find_course_id(name)
    ///     .with_query_context("lookup course", name)?;
    /// ```
    fn with_query_context(self, action: &str, key: &str) -> ApplicationResult<T>;
}

impl<T> QueryResultExt<T> for rusqlite::Result<T> {
    fn with_query_context(self, action: &str, key: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: if key.is_empty() {
                action.to_string()
            } else {
                format!("{}: {}", action, key)
            },
            source: Box::new(e),
        })
    }
}
