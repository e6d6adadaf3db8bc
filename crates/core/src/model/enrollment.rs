use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{EnrollmentId, ProgramId, UserId};
use crate::model::program::DAYS_PER_WEEK;

/// Completed day numbers keyed by week number.
pub type CompletedDays = BTreeMap<u32, BTreeSet<u8>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollmentStateError {
    #[error("current week must be at least 1, got {0}")]
    InvalidCurrentWeek(u32),

    #[error("week {0} is not a valid week number")]
    InvalidWeek(u32),

    #[error("day {day} of week {week} is outside 1..=7")]
    InvalidDay { week: u32, day: u8 },

    #[error("updated_at is before enrolled_at")]
    InvalidTimeRange,
}

/// A user's progress through one program.
///
/// Values are immutable from the outside; the progress engine produces the
/// next value on each day completion and the store persists it. Deserialized
/// values go through [`Enrollment::from_persisted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnrollmentDraft")]
pub struct Enrollment {
    id: EnrollmentId,
    user_id: UserId,
    program_id: ProgramId,
    current_week: u32,
    completed_days: CompletedDays,
    version: u64,
    enrolled_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct EnrollmentDraft {
    id: EnrollmentId,
    user_id: UserId,
    program_id: ProgramId,
    current_week: u32,
    #[serde(default)]
    completed_days: CompletedDays,
    version: u64,
    enrolled_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentDraft> for Enrollment {
    type Error = EnrollmentStateError;

    fn try_from(draft: EnrollmentDraft) -> Result<Self, Self::Error> {
        Enrollment::from_persisted(
            draft.id,
            draft.user_id,
            draft.program_id,
            draft.current_week,
            draft.completed_days,
            draft.version,
            draft.enrolled_at,
            draft.updated_at,
        )
    }
}

impl Enrollment {
    /// A fresh enrollment: week 1, nothing completed, version 0.
    #[must_use]
    pub fn new(
        id: EnrollmentId,
        user_id: UserId,
        program_id: ProgramId,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            program_id,
            current_week: 1,
            completed_days: CompletedDays::new(),
            version: 0,
            enrolled_at,
            updated_at: enrolled_at,
        }
    }

    /// Rehydrate an enrollment from storage.
    ///
    /// Empty week entries are dropped so that an absent week and an empty set
    /// compare equal.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentStateError` if the week pointer is zero, a week key
    /// is zero, a day lies outside 1..=7, or timestamps are inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: EnrollmentId,
        user_id: UserId,
        program_id: ProgramId,
        current_week: u32,
        completed_days: CompletedDays,
        version: u64,
        enrolled_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, EnrollmentStateError> {
        if current_week == 0 {
            return Err(EnrollmentStateError::InvalidCurrentWeek(current_week));
        }
        if updated_at < enrolled_at {
            return Err(EnrollmentStateError::InvalidTimeRange);
        }
        for (&week, days) in &completed_days {
            if week == 0 {
                return Err(EnrollmentStateError::InvalidWeek(week));
            }
            if let Some(&day) = days.iter().find(|d| !(1..=DAYS_PER_WEEK).contains(*d)) {
                return Err(EnrollmentStateError::InvalidDay { week, day });
            }
        }
        let completed_days = completed_days
            .into_iter()
            .filter(|(_, days)| !days.is_empty())
            .collect();

        Ok(Self {
            id,
            user_id,
            program_id,
            current_week,
            completed_days,
            version,
            enrolled_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> EnrollmentId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    #[must_use]
    pub fn current_week(&self) -> u32 {
        self.current_week
    }

    #[must_use]
    pub fn completed_days(&self) -> &CompletedDays {
        &self.completed_days
    }

    /// Optimistic concurrency token; bumped by the store on every update.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy stamped with a new modification time.
    ///
    /// Earlier timestamps than `enrolled_at` are clamped.
    #[must_use]
    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at.max(self.enrolled_at);
        self
    }

    /// Returns a copy carrying the given version, as assigned by a store.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn insert_day(&mut self, week: u32, day: u8) -> bool {
        self.completed_days.entry(week).or_default().insert(day)
    }

    pub(crate) fn set_current_week(&mut self, week: u32) {
        self.current_week = week;
    }
}
