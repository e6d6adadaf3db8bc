#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod catalog_loader;
pub mod enrollment_service;
pub mod error;

pub use program_core::Clock;

pub use app_services::{AppServices, CatalogSource};
pub use auth::AuthContext;
pub use catalog_loader::{builtin_catalog, load_catalog, parse_catalog};
pub use enrollment_service::{DEFAULT_MAX_UPDATE_ATTEMPTS, EnrollmentService};
pub use error::{AppServicesError, CatalogLoadError, EnrollmentError};
