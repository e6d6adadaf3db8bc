use std::sync::Arc;

use program_core::model::{Enrollment, EnrollmentId, Program, ProgramId};
use program_core::progress::{ProgressSnapshot, apply_day_completion, is_week_accessible};
use program_core::ProgramCatalog;
use storage::repository::{EnrollmentRepository, NewEnrollmentRecord, StorageError};

use crate::auth::AuthContext;
use crate::error::EnrollmentError;
use crate::Clock;

/// Attempts per completion before giving up on a contended row.
pub const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 5;

/// Orchestrates enrollment, day completion, and progress views.
///
/// The catalog is read-only; all writes go through the repository's
/// compare-and-swap update, retried on conflict.
#[derive(Clone)]
pub struct EnrollmentService {
    clock: Clock,
    catalog: Arc<ProgramCatalog>,
    enrollments: Arc<dyn EnrollmentRepository>,
    max_update_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Open,
    RequireAccessible,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<ProgramCatalog>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            enrollments,
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }

    /// Override how many times a contended completion is retried (minimum 1).
    #[must_use]
    pub fn with_max_update_attempts(mut self, attempts: u32) -> Self {
        self.max_update_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    /// Fetch a program from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::ProgramNotFound` for unknown ids.
    pub fn get_program(&self, program_id: &ProgramId) -> Result<&Program, EnrollmentError> {
        Ok(self.catalog.get_program(program_id)?)
    }

    /// Fetch the caller's enrollment in a program.
    ///
    /// Returns `Ok(None)` when the caller never enrolled.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::Unauthenticated` for anonymous callers,
    /// `EnrollmentError::ProgramNotFound` for unknown programs, and
    /// `EnrollmentError::StoreUnavailable` if the store cannot be reached.
    pub async fn get_enrollment(
        &self,
        auth: AuthContext,
        program_id: &ProgramId,
    ) -> Result<Option<Enrollment>, EnrollmentError> {
        let user_id = auth.require_user()?;
        self.get_program(program_id)?;
        Ok(self.enrollments.get_enrollment(user_id, program_id).await?)
    }

    /// Enroll the caller in a program at week 1.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::Unauthenticated`, `ProgramNotFound`,
    /// `AlreadyEnrolled` when a record already exists for the pair, or
    /// `StoreUnavailable`.
    pub async fn create_enrollment(
        &self,
        auth: AuthContext,
        program_id: &ProgramId,
    ) -> Result<Enrollment, EnrollmentError> {
        let user_id = auth.require_user()?;
        self.get_program(program_id)?;

        let record = NewEnrollmentRecord::new(user_id, program_id.clone(), self.clock.now());
        let enrollment = match self.enrollments.insert_enrollment(record).await {
            Ok(enrollment) => enrollment,
            Err(StorageError::Conflict) => {
                return Err(EnrollmentError::AlreadyEnrolled(program_id.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            user = %user_id,
            program = %program_id,
            enrollment = %enrollment.id(),
            "enrolled"
        );
        Ok(enrollment)
    }

    /// Return the existing enrollment, or create one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_enrollment`], except that `AlreadyEnrolled` is
    /// never returned.
    pub async fn enroll_or_resume(
        &self,
        auth: AuthContext,
        program_id: &ProgramId,
    ) -> Result<Enrollment, EnrollmentError> {
        if let Some(existing) = self.get_enrollment(auth, program_id).await? {
            return Ok(existing);
        }
        match self.create_enrollment(auth, program_id).await {
            Err(EnrollmentError::AlreadyEnrolled(_)) => self
                .get_enrollment(auth, program_id)
                .await?
                .ok_or(EnrollmentError::EnrollmentNotFound),
            other => other,
        }
    }

    /// Mark a day complete and persist the result.
    ///
    /// Safe to retry: completing the same day twice leaves the record as it
    /// was after the first call. Does not check week accessibility; see
    /// [`Self::complete_unlocked_day`].
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::InvalidDay` for out-of-range arguments,
    /// `EnrollmentNotFound` for unknown ids or enrollments owned by someone
    /// else, `Unauthenticated`, or `StoreUnavailable` when the store is down
    /// or the row stays contended past the retry budget.
    pub async fn record_day_completion(
        &self,
        auth: AuthContext,
        enrollment_id: EnrollmentId,
        week: u32,
        day: u8,
    ) -> Result<Enrollment, EnrollmentError> {
        self.complete_day(auth, enrollment_id, week, day, Gate::Open)
            .await
    }

    /// Like [`Self::record_day_completion`] but rejects days in weeks that
    /// are not yet accessible.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::WeekLocked` when the previous week is not
    /// complete, plus the errors of [`Self::record_day_completion`].
    pub async fn complete_unlocked_day(
        &self,
        auth: AuthContext,
        enrollment_id: EnrollmentId,
        week: u32,
        day: u8,
    ) -> Result<Enrollment, EnrollmentError> {
        self.complete_day(auth, enrollment_id, week, day, Gate::RequireAccessible)
            .await
    }

    /// Derived progress view for the caller's enrollment in a program.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_enrollment`].
    pub async fn progress(
        &self,
        auth: AuthContext,
        program_id: &ProgramId,
    ) -> Result<Option<ProgressSnapshot>, EnrollmentError> {
        let Some(enrollment) = self.get_enrollment(auth, program_id).await? else {
            return Ok(None);
        };
        let program = self.get_program(program_id)?;
        Ok(Some(ProgressSnapshot::compute(program, &enrollment)))
    }

    /// Progress views for every program the caller is enrolled in.
    ///
    /// Enrollments whose program has been removed from the catalog are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::Unauthenticated` or `StoreUnavailable`.
    pub async fn dashboard(
        &self,
        auth: AuthContext,
    ) -> Result<Vec<ProgressSnapshot>, EnrollmentError> {
        let user_id = auth.require_user()?;
        let enrollments = self.enrollments.list_enrollments(user_id).await?;
        let mut snapshots = Vec::with_capacity(enrollments.len());
        for enrollment in &enrollments {
            match self.catalog.get_program(enrollment.program_id()) {
                Ok(program) => snapshots.push(ProgressSnapshot::compute(program, enrollment)),
                Err(err) => tracing::warn!(
                    enrollment = %enrollment.id(),
                    error = %err,
                    "skipping enrollment for unknown program"
                ),
            }
        }
        Ok(snapshots)
    }

    async fn complete_day(
        &self,
        auth: AuthContext,
        enrollment_id: EnrollmentId,
        week: u32,
        day: u8,
        gate: Gate,
    ) -> Result<Enrollment, EnrollmentError> {
        let user_id = auth.require_user()?;

        for attempt in 1..=self.max_update_attempts {
            let current = self
                .enrollments
                .get_enrollment_by_id(enrollment_id)
                .await?
                .filter(|e| e.user_id() == user_id)
                .ok_or(EnrollmentError::EnrollmentNotFound)?;
            let program = self.get_program(current.program_id())?;

            if gate == Gate::RequireAccessible
                && program.contains_week(week)
                && !is_week_accessible(&current, week)
            {
                return Err(EnrollmentError::WeekLocked { week });
            }

            let next = apply_day_completion(program, &current, week, day)?;
            if next.completed_days() == current.completed_days()
                && next.current_week() == current.current_week()
            {
                tracing::debug!(enrollment = %enrollment_id, week, day, "day already recorded");
                return Ok(current);
            }

            let next = next.with_updated_at(self.clock.now());
            match self
                .enrollments
                .update_enrollment(current.version(), &next)
                .await
            {
                Ok(stored) => {
                    tracing::debug!(enrollment = %enrollment_id, week, day, "day recorded");
                    if stored.current_week() > current.current_week() {
                        tracing::info!(
                            enrollment = %enrollment_id,
                            from = current.current_week(),
                            to = stored.current_week(),
                            "advanced to next week"
                        );
                    }
                    return Ok(stored);
                }
                Err(StorageError::Conflict) => {
                    tracing::warn!(
                        enrollment = %enrollment_id,
                        attempt,
                        "enrollment changed concurrently, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(EnrollmentError::StoreUnavailable(format!(
            "enrollment {enrollment_id} still contended after {} attempts",
            self.max_update_attempts
        )))
    }
}
