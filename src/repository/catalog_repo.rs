// ==========================================
// Product Catalog Import - Catalog Repository Trait
// ==========================================
// Responsibility: persistence gateway consumed by the import pipeline
// Red line: no business rules here, data access only
// ==========================================

use crate::domain::product::{InventoryRecord, Product, ProductFamily};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogRepository Trait
// ==========================================
// Implementor: CatalogRepositoryImpl (rusqlite)
//
// Chunk semantics: begin_chunk / commit_chunk / rollback_chunk bracket one
// transactional chunk of rows. Reads issued between begin and commit see
// the chunk's own uncommitted writes (read-your-writes), which is what
// makes duplicate-code detection effective within a single chunk.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== Products =====

    /// Look up a product by its tenant-scoped code
    async fn find_product_by_code(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> RepositoryResult<Option<Product>>;

    /// Persist a product, returning its id
    ///
    /// The tenant+code uniqueness constraint is enforced here.
    async fn create_product(&self, product: &Product) -> RepositoryResult<String>;

    // ===== Inventory =====

    /// Persist the initial inventory record of a product
    async fn create_inventory(&self, inventory: &InventoryRecord) -> RepositoryResult<String>;

    // ===== Families =====

    /// First family whose name contains the given name, case-insensitively
    ///
    /// Deterministic order: lowest rowid wins.
    async fn find_family_by_name_like(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<Option<ProductFamily>>;

    /// Create a family owned by the tenant
    async fn create_family(&self, tenant_id: &str, name: &str)
        -> RepositoryResult<ProductFamily>;

    /// Atomic find-or-create
    ///
    /// On a lost creation race the unique constraint fires and the row the
    /// winner inserted is re-read, so two concurrent callers always end up
    /// with the same family.
    async fn get_or_create_family(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<ProductFamily>;

    // ===== Chunk transaction control =====

    async fn begin_chunk(&self) -> RepositoryResult<()>;
    async fn commit_chunk(&self) -> RepositoryResult<()>;
    async fn rollback_chunk(&self) -> RepositoryResult<()>;
}
