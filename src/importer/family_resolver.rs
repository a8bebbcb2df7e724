// ==========================================
// Product Catalog Import - Family Resolver
// ==========================================
// Responsibility: map a free-text family name to a ProductFamily id,
// creating the family on first sight
// ==========================================

use crate::domain::product::ProductFamily;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use tracing::debug;

// ==========================================
// FamilyResolver
// ==========================================
// Lookup order (delegated to the gateway): case-insensitive containment
// match with the lowest rowid winning, then create. The gateway call is
// atomic per name, so a concurrent job creating the same family resolves
// to the winner's row instead of failing.
pub struct FamilyResolver;

impl FamilyResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a named family for the tenant, creating it when missing
    pub async fn resolve(
        &self,
        tenant_id: &str,
        family_name: &str,
        repo: &dyn CatalogRepository,
    ) -> RepositoryResult<ProductFamily> {
        let name = family_name.trim();
        let family = repo.get_or_create_family(tenant_id, name).await?;
        debug!(
            "family '{}' resolved to {} for tenant {}",
            name, family.family_id, tenant_id
        );
        Ok(family)
    }
}

impl Default for FamilyResolver {
    fn default() -> Self {
        Self::new()
    }
}
