//! Progress engine for guided programs.
//!
//! Everything here is a pure function over a `Program` and an `Enrollment`:
//! derived view state is recomputed on demand, and day completion returns the
//! next `Enrollment` value for the caller to persist.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DAYS_PER_WEEK, Enrollment, Program, ProgramId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("week {week}, day {day} is outside the program (weeks 1..={total_weeks}, days 1..=7)")]
    InvalidDay { week: u32, day: u8, total_weeks: u32 },

    #[error("enrollment belongs to program {enrolled}, not {requested}")]
    ProgramMismatch {
        enrolled: ProgramId,
        requested: ProgramId,
    },
}

static NO_DAYS: BTreeSet<u8> = BTreeSet::new();

//
// ─── QUERIES ───────────────────────────────────────────────────────────────────
//

/// Days completed in `week`; empty when the week has no entry.
#[must_use]
pub fn completed_days_for_week(enrollment: &Enrollment, week: u32) -> &BTreeSet<u8> {
    enrollment.completed_days().get(&week).unwrap_or(&NO_DAYS)
}

#[must_use]
pub fn is_week_complete(enrollment: &Enrollment, week: u32) -> bool {
    completed_days_for_week(enrollment, week).len() >= usize::from(DAYS_PER_WEEK)
}

/// Week 1 is always open; any later week opens once the previous one is complete.
#[must_use]
pub fn is_week_accessible(enrollment: &Enrollment, week: u32) -> bool {
    match week {
        0 => false,
        1 => true,
        w => is_week_complete(enrollment, w - 1),
    }
}

/// Day to resume at: one past the highest completed day, capped at 7.
#[must_use]
pub fn next_day_for_week(enrollment: &Enrollment, week: u32) -> u8 {
    completed_days_for_week(enrollment, week)
        .last()
        .map_or(1, |&max| max.saturating_add(1).min(DAYS_PER_WEEK))
}

/// Share of all program days completed, in `[0, 100]`.
#[must_use]
pub fn overall_progress_percent(program: &Program, enrollment: &Enrollment) -> f64 {
    let total = program.total_days();
    if total == 0 {
        return 0.0;
    }
    let done: usize = (1..=program.total_weeks())
        .map(|w| completed_days_for_week(enrollment, w).len())
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let percent = 100.0 * done as f64 / f64::from(total);
    percent.clamp(0.0, 100.0)
}

/// True once every day of every week has been completed.
#[must_use]
pub fn is_program_complete(program: &Program, enrollment: &Enrollment) -> bool {
    (1..=program.total_weeks()).all(|w| is_week_complete(enrollment, w))
}

//
// ─── TRANSITION ────────────────────────────────────────────────────────────────
//

/// Records `day` of `week` and applies the auto-advance rule.
///
/// The completion is a set insert, so applying the same `(week, day)` twice
/// yields the same state. `current_week` moves forward by one only when the
/// completed week is the current week, it now has all seven days, and it is
/// not the last week.
///
/// # Errors
///
/// Returns `ProgressError::InvalidDay` when `week` or `day` fall outside the
/// program, and `ProgressError::ProgramMismatch` when the enrollment belongs to
/// a different program.
pub fn apply_day_completion(
    program: &Program,
    enrollment: &Enrollment,
    week: u32,
    day: u8,
) -> Result<Enrollment, ProgressError> {
    if enrollment.program_id() != program.id() {
        return Err(ProgressError::ProgramMismatch {
            enrolled: enrollment.program_id().clone(),
            requested: program.id().clone(),
        });
    }
    if !program.contains_week(week) || !(1..=DAYS_PER_WEEK).contains(&day) {
        return Err(ProgressError::InvalidDay {
            week,
            day,
            total_weeks: program.total_weeks(),
        });
    }

    let mut next = enrollment.clone();
    next.insert_day(week, day);

    if is_week_complete(&next, week)
        && week == next.current_week()
        && week < program.total_weeks()
    {
        next.set_current_week(week + 1);
    }

    Ok(next)
}

//
// ─── VIEW STATE ────────────────────────────────────────────────────────────────
//

/// Derived status of a single week, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekStatus {
    pub week_number: u32,
    pub title: String,
    pub accessible: bool,
    pub complete: bool,
    pub is_current: bool,
    pub completed_days: Vec<u8>,
    pub next_day: u8,
}

/// Immutable snapshot of an enrollment's derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub program_id: ProgramId,
    pub program_title: String,
    pub current_week: u32,
    pub total_weeks: u32,
    pub completed_days: u32,
    pub total_days: u32,
    pub percent: f64,
    pub program_complete: bool,
    pub weeks: Vec<WeekStatus>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn compute(program: &Program, enrollment: &Enrollment) -> Self {
        let weeks: Vec<WeekStatus> = program
            .weeks()
            .iter()
            .map(|week| {
                let n = week.week_number();
                WeekStatus {
                    week_number: n,
                    title: week.title().to_owned(),
                    accessible: is_week_accessible(enrollment, n),
                    complete: is_week_complete(enrollment, n),
                    is_current: n == enrollment.current_week(),
                    completed_days: completed_days_for_week(enrollment, n)
                        .iter()
                        .copied()
                        .collect(),
                    next_day: next_day_for_week(enrollment, n),
                }
            })
            .collect();
        let completed_days = weeks
            .iter()
            .map(|w| u32::try_from(w.completed_days.len()).unwrap_or(u32::MAX))
            .sum();

        Self {
            program_id: program.id().clone(),
            program_title: program.title().to_owned(),
            current_week: enrollment.current_week(),
            total_weeks: program.total_weeks(),
            completed_days,
            total_days: program.total_days(),
            percent: overall_progress_percent(program, enrollment),
            program_complete: is_program_complete(program, enrollment),
            weeks,
        }
    }

    /// Status of the week the enrollment currently points at.
    #[must_use]
    pub fn current(&self) -> Option<&WeekStatus> {
        self.weeks.iter().find(|w| w.is_current)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
