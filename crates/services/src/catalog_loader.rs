//! Loading the program catalog from configuration data.

use std::path::Path;

use program_core::{CatalogDocument, ProgramCatalog};

use crate::error::CatalogLoadError;

/// Catalog shipped with the application.
pub const BUILTIN_CATALOG_JSON: &str = include_str!("../catalog/programs.json");

/// Parse and validate a catalog JSON document.
///
/// # Errors
///
/// Returns `CatalogLoadError::Parse` for malformed JSON or programs that fail
/// validation, `CatalogLoadError::Catalog` for duplicate ids, and
/// `CatalogLoadError::Empty` when no programs are defined.
pub fn parse_catalog(json: &str) -> Result<ProgramCatalog, CatalogLoadError> {
    let document: CatalogDocument = serde_json::from_str(json)?;
    if document.programs.is_empty() {
        return Err(CatalogLoadError::Empty);
    }
    let catalog = ProgramCatalog::from_document(document)?;
    tracing::debug!(programs = catalog.len(), "program catalog loaded");
    Ok(catalog)
}

/// Read a catalog file from disk.
///
/// # Errors
///
/// Returns `CatalogLoadError::Io` if the file cannot be read, otherwise the
/// errors of [`parse_catalog`].
pub fn load_catalog(path: &Path) -> Result<ProgramCatalog, CatalogLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&raw)
}

/// The built-in catalog.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the embedded document is invalid.
pub fn builtin_catalog() -> Result<ProgramCatalog, CatalogLoadError> {
    parse_catalog(BUILTIN_CATALOG_JSON)
}
