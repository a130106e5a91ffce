//! Service container for dependency injection
//!
//! Opens the database once and wires it into the services.

use std::sync::Arc;

use crate::application::services::GradebookService;
use crate::config::Settings;
use crate::infrastructure::store::{OpenMode, SqliteStore};
use crate::infrastructure::traits::GradeStore;
use crate::infrastructure::InfraResult;

/// Container holding all application services.
///
/// Owns the database handle; dropping the container closes it.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Grade queries and updates
    pub gradebook: GradebookService,
}

impl ServiceContainer {
    /// Create a container backed by the configured SQLite database.
    ///
    /// The database must already hold the gradebook tables.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let store = SqliteStore::open(&settings.database, OpenMode::Existing)?;
        Ok(Self::with_store(settings, Box::new(store)))
    }

    /// Create a service container with a custom store (for testing).
    pub fn with_store(settings: Settings, store: Box<dyn GradeStore>) -> Self {
        let settings = Arc::new(settings);
        let gradebook = GradebookService::new(store);

        Self {
            settings,
            gradebook,
        }
    }
}
