use std::path::Path;
use std::sync::Arc;

use program_core::ProgramCatalog;
use storage::repository::Storage;

use crate::catalog_loader::{builtin_catalog, load_catalog};
use crate::enrollment_service::EnrollmentService;
use crate::error::AppServicesError;
use crate::Clock;

/// Where the program catalog comes from.
#[derive(Debug, Clone, Copy)]
pub enum CatalogSource<'a> {
    Builtin,
    File(&'a Path),
}

impl CatalogSource<'_> {
    fn load(self) -> Result<ProgramCatalog, AppServicesError> {
        let catalog = match self {
            CatalogSource::Builtin => builtin_catalog()?,
            CatalogSource::File(path) => load_catalog(path)?,
        };
        Ok(catalog)
    }
}

/// Assembles app-facing services over a catalog and a storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<ProgramCatalog>,
    enrollment_service: Arc<EnrollmentService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog cannot be loaded or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: CatalogSource<'_>,
    ) -> Result<Self, AppServicesError> {
        let catalog = catalog.load()?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::assemble(clock, catalog, &storage))
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog cannot be loaded.
    pub fn new_in_memory(
        clock: Clock,
        catalog: CatalogSource<'_>,
    ) -> Result<Self, AppServicesError> {
        let catalog = catalog.load()?;
        Ok(Self::assemble(clock, catalog, &Storage::in_memory()))
    }

    fn assemble(clock: Clock, catalog: ProgramCatalog, storage: &Storage) -> Self {
        let catalog = Arc::new(catalog);
        let enrollment_service = Arc::new(EnrollmentService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.enrollments),
        ));
        tracing::debug!(programs = catalog.len(), "app services ready");
        Self {
            catalog,
            enrollment_service,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ProgramCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn enrollment_service(&self) -> Arc<EnrollmentService> {
        Arc::clone(&self.enrollment_service)
    }
}
