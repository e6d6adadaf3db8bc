//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use program_core::model::ProgramId;
use program_core::{CatalogError, ProgressError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `EnrollmentService`.
///
/// Only `StoreUnavailable` is transient; every other variant is permanent for
/// the same arguments and should be surfaced to the user instead of retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("program not found: {0}")]
    ProgramNotFound(ProgramId),
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("no signed-in user")]
    Unauthenticated,
    #[error("already enrolled in {0}")]
    AlreadyEnrolled(ProgramId),
    #[error("week {week}, day {day} is not part of this program")]
    InvalidDay { week: u32, day: u8 },
    #[error("week {week} is locked until the previous week is complete")]
    WeekLocked { week: u32 },
    #[error("enrollment store unavailable: {0}")]
    StoreUnavailable(String),
    #[error(transparent)]
    Catalog(CatalogError),
    #[error(transparent)]
    Progress(ProgressError),
    #[error(transparent)]
    Storage(StorageError),
}

impl EnrollmentError {
    /// True when the identical call may be retried safely.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnrollmentError::StoreUnavailable(_))
    }
}

impl From<StorageError> for EnrollmentError {
    fn from(err: StorageError) -> Self {
        if err.is_transient() {
            return EnrollmentError::StoreUnavailable(err.to_string());
        }
        match err {
            StorageError::NotFound => EnrollmentError::EnrollmentNotFound,
            other => EnrollmentError::Storage(other),
        }
    }
}

impl From<CatalogError> for EnrollmentError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => EnrollmentError::ProgramNotFound(id),
            CatalogError::InvalidDay { week, day, .. } => EnrollmentError::InvalidDay { week, day },
            other => EnrollmentError::Catalog(other),
        }
    }
}

impl From<ProgressError> for EnrollmentError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::InvalidDay { week, day, .. } => EnrollmentError::InvalidDay { week, day },
            other => EnrollmentError::Progress(other),
        }
    }
}

/// Errors emitted while loading a program catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("catalog contains no programs")]
    Empty,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_outages_are_retryable() {
        assert!(EnrollmentError::from(StorageError::Connection("refused".into())).is_retryable());
        assert!(!EnrollmentError::Unauthenticated.is_retryable());
        assert!(!EnrollmentError::InvalidDay { week: 9, day: 1 }.is_retryable());
        let id = ProgramId::new("calm").unwrap();
        assert!(!EnrollmentError::AlreadyEnrolled(id).is_retryable());
    }

    #[test]
    fn catalog_not_found_maps_to_program_not_found() {
        let id = ProgramId::new("missing").unwrap();
        let err = EnrollmentError::from(CatalogError::NotFound(id.clone()));
        assert!(matches!(err, EnrollmentError::ProgramNotFound(ref p) if *p == id));
    }

    #[test]
    fn catalog_invalid_day_keeps_coordinates() {
        let err = EnrollmentError::from(CatalogError::InvalidDay {
            program: ProgramId::new("calm").unwrap(),
            week: 5,
            day: 2,
            total_weeks: 4,
        });
        assert!(matches!(err, EnrollmentError::InvalidDay { week: 5, day: 2 }));
    }

    #[test]
    fn storage_errors_split_by_transience() {
        let err = EnrollmentError::from(StorageError::Connection("refused".into()));
        assert!(matches!(err, EnrollmentError::StoreUnavailable(ref m) if m.contains("refused")));
        assert!(matches!(
            EnrollmentError::from(StorageError::NotFound),
            EnrollmentError::EnrollmentNotFound
        ));
        assert!(matches!(
            EnrollmentError::from(StorageError::Serialization("bad json".into())),
            EnrollmentError::Storage(_)
        ));
    }

    #[test]
    fn progress_invalid_day_keeps_coordinates() {
        let err = EnrollmentError::from(ProgressError::InvalidDay {
            week: 3,
            day: 8,
            total_weeks: 2,
        });
        assert!(matches!(err, EnrollmentError::InvalidDay { week: 3, day: 8 }));
    }
}
