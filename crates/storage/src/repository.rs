use async_trait::async_trait;
use chrono::{DateTime, Utc};
use program_core::model::{Enrollment, EnrollmentId, ProgramId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True for failures that may succeed when the identical call is retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// Fields needed to create an enrollment; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollmentRecord {
    pub user_id: UserId,
    pub program_id: ProgramId,
    pub enrolled_at: DateTime<Utc>,
}

impl NewEnrollmentRecord {
    #[must_use]
    pub fn new(user_id: UserId, program_id: ProgramId, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            program_id,
            enrolled_at,
        }
    }
}

/// Repository contract for enrollments.
///
/// One row per (user, program). Updates are compare-and-swap on the
/// enrollment's `version`, so two writers racing on the same row cannot
/// silently overwrite each other.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fetch the enrollment for a user and program.
    ///
    /// Returns `Ok(None)` when the user never enrolled.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_enrollment(
        &self,
        user_id: UserId,
        program_id: &ProgramId,
    ) -> Result<Option<Enrollment>, StorageError>;

    /// Fetch an enrollment by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_enrollment_by_id(
        &self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StorageError>;

    /// Insert a new enrollment at week 1 with no completed days.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the user is already enrolled in the
    /// program, or other storage errors.
    async fn insert_enrollment(
        &self,
        record: NewEnrollmentRecord,
    ) -> Result<Enrollment, StorageError>;

    /// Replace the stored state of `next.id()` if its version still equals
    /// `expected_version`. Returns the stored value with its new version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the row changed since it was read,
    /// `StorageError::NotFound` if it no longer exists, or other storage errors.
    async fn update_enrollment(
        &self,
        expected_version: u64,
        next: &Enrollment,
    ) -> Result<Enrollment, StorageError>;

    /// All enrollments of a user, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    next_id: u64,
    enrollments: HashMap<EnrollmentId, Enrollment>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn get_enrollment(
        &self,
        user_id: UserId,
        program_id: &ProgramId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .enrollments
            .values()
            .find(|e| e.user_id() == user_id && e.program_id() == program_id)
            .cloned())
    }

    async fn get_enrollment_by_id(
        &self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.enrollments.get(&id).cloned())
    }

    async fn insert_enrollment(
        &self,
        record: NewEnrollmentRecord,
    ) -> Result<Enrollment, StorageError> {
        let mut guard = self.lock()?;
        let exists = guard
            .enrollments
            .values()
            .any(|e| e.user_id() == record.user_id && *e.program_id() == record.program_id);
        if exists {
            return Err(StorageError::Conflict);
        }
        guard.next_id += 1;
        let id = EnrollmentId::new(guard.next_id);
        let enrollment = Enrollment::new(id, record.user_id, record.program_id, record.enrolled_at);
        guard.enrollments.insert(id, enrollment.clone());
        Ok(enrollment)
    }

    async fn update_enrollment(
        &self,
        expected_version: u64,
        next: &Enrollment,
    ) -> Result<Enrollment, StorageError> {
        let mut guard = self.lock()?;
        let current = guard
            .enrollments
            .get(&next.id())
            .ok_or(StorageError::NotFound)?;
        if current.version() != expected_version {
            return Err(StorageError::Conflict);
        }
        let stored = next.clone().with_version(expected_version + 1);
        guard.enrollments.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError> {
        let guard = self.lock()?;
        let mut found: Vec<Enrollment> = guard
            .enrollments
            .values()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect();
        found.sort_by_key(Enrollment::id);
        Ok(found)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub enrollments: Arc<dyn EnrollmentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let enrollments: Arc<dyn EnrollmentRepository> = Arc::new(InMemoryRepository::new());
        Self { enrollments }
    }
}
