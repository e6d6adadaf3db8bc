use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ProgramId;

/// Every week of a guided program has exactly this many daily lessons.
pub const DAYS_PER_WEEK: u8 = 7;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgramError {
    #[error("program title cannot be empty")]
    EmptyTitle,

    #[error("program must contain at least one week")]
    NoWeeks,

    #[error("week {found} is out of sequence, expected week {expected}")]
    WeekOutOfSequence { expected: u32, found: u32 },

    #[error("week {week} title cannot be empty")]
    EmptyWeekTitle { week: u32 },

    #[error("week {week} has {count} days, expected 7")]
    WrongDayCount { week: u32, count: usize },

    #[error("day {found} is out of sequence, expected day {expected}")]
    DayOutOfSequence { expected: u8, found: u8 },

    #[error("day {day} must have a non-empty title and body")]
    EmptyLesson { day: u8 },
}

//
// ─── LESSONS ───────────────────────────────────────────────────────────────────
//

/// One daily unit of a week: reading plus an optional exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DayLessonDraft")]
pub struct DayLesson {
    day_number: u8,
    title: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exercise: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DayLessonDraft {
    day_number: u8,
    title: String,
    body: String,
    #[serde(default)]
    exercise: Option<String>,
}

impl TryFrom<DayLessonDraft> for DayLesson {
    type Error = ProgramError;

    fn try_from(draft: DayLessonDraft) -> Result<Self, Self::Error> {
        DayLesson::new(draft.day_number, draft.title, draft.body, draft.exercise)
    }
}

impl DayLesson {
    /// Creates a lesson for the given day.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError::DayOutOfSequence` if `day_number` is outside 1..=7,
    /// or `ProgramError::EmptyLesson` if title or body are blank.
    pub fn new(
        day_number: u8,
        title: impl Into<String>,
        body: impl Into<String>,
        exercise: Option<String>,
    ) -> Result<Self, ProgramError> {
        if !(1..=DAYS_PER_WEEK).contains(&day_number) {
            return Err(ProgramError::DayOutOfSequence {
                expected: day_number.clamp(1, DAYS_PER_WEEK),
                found: day_number,
            });
        }
        let title = title.into().trim().to_owned();
        let body = body.into().trim().to_owned();
        if title.is_empty() || body.is_empty() {
            return Err(ProgramError::EmptyLesson { day: day_number });
        }
        let exercise = exercise
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Self {
            day_number,
            title,
            body,
            exercise,
        })
    }

    #[must_use]
    pub fn day_number(&self) -> u8 {
        self.day_number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn exercise(&self) -> Option<&str> {
        self.exercise.as_deref()
    }
}

//
// ─── WEEKS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WeekDraft")]
pub struct Week {
    week_number: u32,
    title: String,
    description: String,
    days: Vec<DayLesson>,
}

#[derive(Debug, Clone, Deserialize)]
struct WeekDraft {
    week_number: u32,
    title: String,
    #[serde(default)]
    description: String,
    days: Vec<DayLesson>,
}

impl TryFrom<WeekDraft> for Week {
    type Error = ProgramError;

    fn try_from(draft: WeekDraft) -> Result<Self, Self::Error> {
        Week::new(draft.week_number, draft.title, draft.description, draft.days)
    }
}

impl Week {
    /// Creates a week from its seven lessons.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError::WrongDayCount` unless exactly seven lessons are
    /// given, and `ProgramError::DayOutOfSequence` unless they are numbered
    /// 1..=7 in order.
    pub fn new(
        week_number: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        days: Vec<DayLesson>,
    ) -> Result<Self, ProgramError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ProgramError::EmptyWeekTitle { week: week_number });
        }
        if days.len() != usize::from(DAYS_PER_WEEK) {
            return Err(ProgramError::WrongDayCount {
                week: week_number,
                count: days.len(),
            });
        }
        for (expected, lesson) in (1..=DAYS_PER_WEEK).zip(&days) {
            if lesson.day_number() != expected {
                return Err(ProgramError::DayOutOfSequence {
                    expected,
                    found: lesson.day_number(),
                });
            }
        }

        Ok(Self {
            week_number,
            title,
            description: description.into().trim().to_owned(),
            days,
        })
    }

    #[must_use]
    pub fn week_number(&self) -> u32 {
        self.week_number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lessons ordered by day, always seven of them.
    #[must_use]
    pub fn days(&self) -> &[DayLesson] {
        &self.days
    }

    #[must_use]
    pub fn day(&self, day_number: u8) -> Option<&DayLesson> {
        let index = usize::from(day_number.checked_sub(1)?);
        self.days.get(index)
    }
}

//
// ─── PROGRAM ───────────────────────────────────────────────────────────────────
//

/// A multi-week guided program as authored in the catalog.
///
/// Immutable once built; weeks are numbered 1..=`total_weeks` without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProgramDraft")]
pub struct Program {
    id: ProgramId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    weeks: Vec<Week>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProgramDraft {
    id: ProgramId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    weeks: Vec<Week>,
}

impl TryFrom<ProgramDraft> for Program {
    type Error = ProgramError;

    fn try_from(draft: ProgramDraft) -> Result<Self, Self::Error> {
        Program::new(draft.id, draft.title, draft.description, draft.weeks)
    }
}

impl Program {
    /// Creates a program from its weeks.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError::EmptyTitle` for a blank title,
    /// `ProgramError::NoWeeks` when `weeks` is empty, and
    /// `ProgramError::WeekOutOfSequence` unless weeks are numbered from 1
    /// without gaps.
    pub fn new(
        id: ProgramId,
        title: impl Into<String>,
        description: Option<String>,
        weeks: Vec<Week>,
    ) -> Result<Self, ProgramError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ProgramError::EmptyTitle);
        }
        if weeks.is_empty() {
            return Err(ProgramError::NoWeeks);
        }
        for (expected, week) in (1..).zip(&weeks) {
            if week.week_number() != expected {
                return Err(ProgramError::WeekOutOfSequence {
                    expected,
                    found: week.week_number(),
                });
            }
        }
        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title,
            description,
            weeks,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ProgramId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Number of weeks; always at least 1.
    #[must_use]
    pub fn total_weeks(&self) -> u32 {
        u32::try_from(self.weeks.len()).unwrap_or(u32::MAX)
    }

    /// Number of daily lessons across the whole program.
    #[must_use]
    pub fn total_days(&self) -> u32 {
        self.total_weeks()
            .saturating_mul(u32::from(DAYS_PER_WEEK))
    }

    #[must_use]
    pub fn contains_week(&self, week_number: u32) -> bool {
        (1..=self.total_weeks()).contains(&week_number)
    }

    #[must_use]
    pub fn week(&self, week_number: u32) -> Option<&Week> {
        let index = usize::try_from(week_number.checked_sub(1)?).ok()?;
        self.weeks.get(index)
    }

    #[must_use]
    pub fn lesson(&self, week_number: u32, day_number: u8) -> Option<&DayLesson> {
        self.week(week_number)?.day(day_number)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn lessons() -> Vec<DayLesson> {
        (1..=DAYS_PER_WEEK)
            .map(|d| DayLesson::new(d, format!("Day {d}"), "Read and reflect.", None).unwrap())
            .collect()
    }

    fn week(n: u32) -> Week {
        Week::new(n, format!("Week {n}"), "", lessons()).unwrap()
    }

    #[test]
    fn program_happy_path() {
        let program = Program::new(
            ProgramId::new("life-transition").unwrap(),
            "  Life Transition  ",
            Some("  Navigating change  ".into()),
            vec![week(1), week(2), week(3)],
        )
        .unwrap();

        assert_eq!(program.title(), "Life Transition");
        assert_eq!(program.description(), Some("Navigating change"));
        assert_eq!(program.total_weeks(), 3);
        assert_eq!(program.total_days(), 21);
        assert!(program.contains_week(3));
        assert!(!program.contains_week(0));
        assert!(!program.contains_week(4));
        assert_eq!(program.lesson(2, 7).unwrap().title(), "Day 7");
        assert!(program.lesson(2, 8).is_none());
        assert!(program.lesson(4, 1).is_none());
    }

    #[test]
    fn program_rejects_empty_weeks() {
        let err = Program::new(ProgramId::new("empty").unwrap(), "Empty", None, vec![]).unwrap_err();
        assert_eq!(err, ProgramError::NoWeeks);
    }

    #[test]
    fn program_rejects_gap_in_week_numbers() {
        let err = Program::new(
            ProgramId::new("gappy").unwrap(),
            "Gappy",
            None,
            vec![week(1), week(3)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProgramError::WeekOutOfSequence {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn week_requires_exactly_seven_days() {
        let mut six = lessons();
        six.pop();
        let err = Week::new(1, "Short", "", six).unwrap_err();
        assert_eq!(err, ProgramError::WrongDayCount { week: 1, count: 6 });
    }

    #[test]
    fn week_requires_ordered_days() {
        let mut days = lessons();
        days.swap(2, 3);
        let err = Week::new(1, "Shuffled", "", days).unwrap_err();
        assert_eq!(
            err,
            ProgramError::DayOutOfSequence {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn lesson_rejects_day_zero_and_blank_body() {
        assert!(DayLesson::new(0, "Zero", "Body", None).is_err());
        assert!(DayLesson::new(8, "Eight", "Body", None).is_err());
        assert_eq!(
            DayLesson::new(2, "Title", "   ", None).unwrap_err(),
            ProgramError::EmptyLesson { day: 2 }
        );
    }

    #[test]
    fn lesson_drops_blank_exercise() {
        let lesson = DayLesson::new(1, "Title", "Body", Some("  ".into())).unwrap();
        assert_eq!(lesson.exercise(), None);
    }

    #[test]
    fn deserialization_runs_validation() {
        let days: Vec<serde_json::Value> = (1..=7)
            .map(|d| serde_json::json!({"day_number": d, "title": "t", "body": "b"}))
            .collect();
        let good = serde_json::json!({
            "id": "two-step",
            "title": "Two Step",
            "weeks": [
                {"week_number": 1, "title": "One", "days": days.clone()},
                {"week_number": 2, "title": "Two", "days": days.clone()},
            ],
        });
        let program: Program = serde_json::from_value(good).unwrap();
        assert_eq!(program.total_weeks(), 2);

        let bad = serde_json::json!({
            "id": "short",
            "title": "Short",
            "weeks": [{"week_number": 1, "title": "One", "days": &days[..5]}],
        });
        assert!(serde_json::from_value::<Program>(bad).is_err());

        let mut blank_days = days.clone();
        blank_days[0] = serde_json::json!({"day_number": 1, "title": "   ", "body": ""});
        let blank = serde_json::json!({"week_number": 1, "title": "One", "days": blank_days});
        assert!(serde_json::from_value::<Week>(blank).is_err());

        let padded: DayLesson = serde_json::from_value(serde_json::json!({
            "day_number": 2,
            "title": "  Breathe  ",
            "body": " In and out ",
            "exercise": "   ",
        }))
        .unwrap();
        assert_eq!(padded.title(), "Breathe");
        assert_eq!(padded.body(), "In and out");
        assert_eq!(padded.exercise(), None);
    }
}
