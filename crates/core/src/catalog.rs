use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{DayLesson, Program, ProgramId};

/// On-disk shape of a catalog file: `{"programs": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub programs: Vec<Program>,
}

/// Read-only set of programs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: BTreeMap<ProgramId, Program>,
}

impl ProgramCatalog {
    /// Builds a catalog, rejecting duplicate program ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProgram` if two programs share an id.
    pub fn new(programs: impl IntoIterator<Item = Program>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for program in programs {
            let id = program.id().clone();
            if map.insert(id.clone(), program).is_some() {
                return Err(CatalogError::DuplicateProgram(id));
            }
        }
        Ok(Self { programs: map })
    }

    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProgram` if two programs share an id.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        Self::new(document.programs)
    }

    /// Looks up a program by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id. This is permanent;
    /// retrying with the same id will not succeed.
    pub fn get_program(&self, id: &ProgramId) -> Result<&Program, CatalogError> {
        self.programs
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Programs ordered by id.
    pub fn list_programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Lesson content for a given day.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown program and
    /// `CatalogError::InvalidDay` when the week or day lies outside it.
    pub fn lesson(&self, id: &ProgramId, week: u32, day: u8) -> Result<&DayLesson, CatalogError> {
        let program = self.get_program(id)?;
        program.lesson(week, day).ok_or_else(|| CatalogError::InvalidDay {
            program: id.clone(),
            week,
            day,
            total_weeks: program.total_weeks(),
        })
    }
}
