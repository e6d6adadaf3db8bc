use thiserror::Error;

use crate::model::ProgramId;

/// Errors raised while building or querying the program catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("program not found: {0}")]
    NotFound(ProgramId),

    #[error("program {0} is defined more than once")]
    DuplicateProgram(ProgramId),

    #[error("{program} has no lesson for week {week}, day {day} ({total_weeks} weeks, 7 days each)")]
    InvalidDay {
        program: ProgramId,
        week: u32,
        day: u8,
        total_weeks: u32,
    },
}
