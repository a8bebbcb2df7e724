// ==========================================
// Product Catalog Import - Product Creator
// ==========================================
// Responsibility: validate -> build -> persist one row as a product plus
// its initial inventory record
// Red line: failures never escape the row; everything is captured on the
// RowOutcome so the run continues
// ==========================================

use crate::domain::import::{ImportRow, RowError, RowOutcome};
use crate::domain::product::{InventoryRecord, Product};
use crate::domain::types::{ProductCategory, RowErrorKind};
use crate::importer::family_resolver::FamilyResolver;
use crate::importer::row_validator::RowValidator;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// ProductCreator
// ==========================================
pub struct ProductCreator {
    validator: RowValidator,
    family_resolver: FamilyResolver,
}

impl ProductCreator {
    pub fn new(validator: RowValidator, family_resolver: FamilyResolver) -> Self {
        Self {
            validator,
            family_resolver,
        }
    }

    /// Process one decoded row to a final disposition
    ///
    /// Order: validation (all checks), family resolution, product insert,
    /// inventory insert. The first failing stage settles the outcome.
    pub async fn process_row(
        &self,
        row: &ImportRow,
        tenant_id: &str,
        repo: &dyn CatalogRepository,
    ) -> RowOutcome {
        // ===== Step 1: validation =====
        let errors = match self.validator.validate(row, tenant_id, repo).await {
            Ok(errors) => errors,
            Err(e) => {
                warn!("row {} validation query failed: {}", row.row_number, e);
                return RowOutcome::failure(
                    row,
                    vec![RowError::general(
                        row,
                        RowErrorKind::System,
                        format!("validation query failed: {}", e),
                    )],
                );
            }
        };
        if !errors.is_empty() {
            return RowOutcome::failure(row, errors);
        }

        // ===== Step 2: family resolution (only when a family was named) =====
        let family_id = match &row.family_name {
            Some(family_name) => {
                match self
                    .family_resolver
                    .resolve(tenant_id, family_name, repo)
                    .await
                {
                    Ok(family) => Some(family.family_id),
                    Err(e) => {
                        warn!(
                            "row {} family '{}' resolution failed: {}",
                            row.row_number, family_name, e
                        );
                        return RowOutcome::failure(
                            row,
                            vec![RowError::new(
                                row,
                                "family",
                                Some(family_name.clone()),
                                RowErrorKind::FamilyError,
                                format!("could not resolve family '{}': {}", family_name, e),
                                None,
                            )],
                        );
                    }
                }
            }
            None => None,
        };

        // ===== Step 3: build the product =====
        // Validation guarantees code / name / quantity are present.
        let (code, name, quantity) = match (&row.code, &row.name, row.quantity) {
            (Some(code), Some(name), Some(quantity)) => (code.clone(), name.clone(), quantity),
            _ => {
                return RowOutcome::failure(
                    row,
                    vec![RowError::general(
                        row,
                        RowErrorKind::System,
                        "mandatory fields missing after validation",
                    )],
                );
            }
        };

        let now = Utc::now();
        let product = Product {
            product_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            code,
            name,
            description: row.description.clone(),
            price: row.price,
            manufacturer: row.manufacturer.clone(),
            upc: row.upc.clone(),
            manufacturer_code: row.manufacturer_code.clone(),
            min_stock_level: row.min_stock_level.unwrap_or(Decimal::ZERO),
            category: row
                .category
                .as_deref()
                .and_then(ProductCategory::parse)
                .unwrap_or(ProductCategory::Misc),
            family_id,
            apply_tax: row.apply_tax.unwrap_or(false),
            visible: row.visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        // ===== Step 4: persist product =====
        let product_id = match repo.create_product(&product).await {
            Ok(id) => id,
            Err(e) => {
                warn!("row {} product insert failed: {}", row.row_number, e);
                let kind = match e {
                    // A race lost between the uniqueness check and the
                    // insert still reports as a duplicate, not a crash
                    RepositoryError::UniqueConstraintViolation(_) => RowErrorKind::Duplicate,
                    _ => RowErrorKind::System,
                };
                return RowOutcome::failure(
                    row,
                    vec![RowError::new(
                        row,
                        "code",
                        Some(product.code.clone()),
                        kind,
                        format!("failed to create product: {}", e),
                        None,
                    )],
                );
            }
        };

        // ===== Step 5: persist initial inventory =====
        let inventory = InventoryRecord {
            inventory_id: Uuid::new_v4().to_string(),
            product_id: product_id.clone(),
            tenant_id: tenant_id.to_string(),
            quantity,
            status: InventoryRecord::status_for_quantity(quantity),
            created_at: now,
        };
        if let Err(e) = repo.create_inventory(&inventory).await {
            warn!("row {} inventory insert failed: {}", row.row_number, e);
            return RowOutcome::failure(
                row,
                vec![RowError::general(
                    row,
                    RowErrorKind::System,
                    format!("failed to create inventory record: {}", e),
                )],
            );
        }

        debug!(
            "row {} created product {} (code {})",
            row.row_number, product_id, product.code
        );
        RowOutcome::success(row, product_id, product.code)
    }
}

impl Default for ProductCreator {
    fn default() -> Self {
        Self::new(RowValidator::new(), FamilyResolver::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::InventoryStatus;
    use crate::repository::catalog_repo_impl::CatalogRepositoryImpl;
    use crate::repository::schema::init_schema;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    fn repo() -> CatalogRepositoryImpl {
        let conn = crate::db::open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        CatalogRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn row(code: &str, quantity: &str) -> ImportRow {
        ImportRow {
            row_number: 2,
            data_row_number: 1,
            code: Some(code.to_string()),
            name: Some("Widget".to_string()),
            quantity: Some(Decimal::from_str(quantity).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_creates_product_with_defaults() {
        let repo = repo();
        let creator = ProductCreator::default();

        let outcome = creator.process_row(&row("P-1", "4"), "t1", &repo).await;
        assert!(outcome.success, "errors: {:?}", outcome.errors);

        use crate::repository::catalog_repo::CatalogRepository;
        let product = repo
            .find_product_by_code("t1", "P-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.category, ProductCategory::Misc);
        assert_eq!(product.min_stock_level, Decimal::ZERO);
        assert!(!product.apply_tax);
        assert!(product.visible);
        assert!(product.family_id.is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_marks_out_of_stock() {
        let quantity = Decimal::ZERO;
        assert_eq!(
            InventoryRecord::status_for_quantity(quantity),
            InventoryStatus::OutOfStock
        );

        let repo = repo();
        let creator = ProductCreator::default();
        let outcome = creator.process_row(&row("P-0", "0"), "t1", &repo).await;
        assert!(outcome.success, "errors: {:?}", outcome.errors);
    }

    #[tokio::test]
    async fn test_invalid_row_yields_failure_outcome() {
        let repo = repo();
        let creator = ProductCreator::default();

        let mut bad = row("P-2", "1");
        bad.name = None;
        let outcome = creator.process_row(&bad, "t1", &repo).await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors[0].kind, RowErrorKind::MissingMandatory);
        assert!(outcome.product_id.is_none());
    }

    #[tokio::test]
    async fn test_named_family_is_attached() {
        let repo = repo();
        let creator = ProductCreator::default();

        let mut with_family = row("P-3", "2");
        with_family.family_name = Some("Kitchen".to_string());
        let outcome = creator.process_row(&with_family, "t1", &repo).await;
        assert!(outcome.success, "errors: {:?}", outcome.errors);

        use crate::repository::catalog_repo::CatalogRepository;
        let product = repo
            .find_product_by_code("t1", "P-3")
            .await
            .unwrap()
            .unwrap();
        assert!(product.family_id.is_some());
    }

    #[tokio::test]
    async fn test_second_row_with_same_code_fails_as_duplicate() {
        let repo = repo();
        let creator = ProductCreator::default();

        let first = creator.process_row(&row("P-4", "1"), "t1", &repo).await;
        assert!(first.success);

        let second = creator.process_row(&row("P-4", "1"), "t1", &repo).await;
        assert!(!second.success);
        assert_eq!(second.errors[0].kind, RowErrorKind::Duplicate);
    }
}
