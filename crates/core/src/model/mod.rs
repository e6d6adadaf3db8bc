mod enrollment;
mod ids;
mod program;

pub use ids::{EnrollmentId, ParseIdError, ProgramId, UserId};

pub use enrollment::{CompletedDays, Enrollment, EnrollmentStateError};
pub use program::{DAYS_PER_WEEK, DayLesson, Program, ProgramError, Week};
