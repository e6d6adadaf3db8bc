#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod progress;
pub mod time;

pub use catalog::{CatalogDocument, ProgramCatalog};
pub use error::CatalogError;
pub use progress::{ProgressError, ProgressSnapshot, WeekStatus};
pub use time::Clock;
