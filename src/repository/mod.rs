// ==========================================
// Product Catalog Import - Repository layer
// ==========================================
// Responsibility: data access for catalog entities and the job ledger
// Red line: no business rules, CRUD only
// ==========================================

pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;
pub mod import_job_repo;
pub mod import_job_repo_impl;
pub mod schema;

// Re-export core types
pub use catalog_repo::CatalogRepository;
pub use catalog_repo_impl::CatalogRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use import_job_repo::ImportJobRepository;
pub use import_job_repo_impl::ImportJobRepositoryImpl;
pub use schema::init_schema;
