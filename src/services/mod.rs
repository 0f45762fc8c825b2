pub mod catalog_service;
pub mod enrollment_resolver;

pub use catalog_service::{CatalogService, DashboardSummary};
pub use enrollment_resolver::{EnrollOutcome, EnrollmentResolver, select_batch};
