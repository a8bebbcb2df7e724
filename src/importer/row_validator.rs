// ==========================================
// Product Catalog Import - Row Validator
// ==========================================
// Responsibility: business validation of one decoded row
// Red line: read-only; every check runs (no short-circuit) so the user
// sees all problems of a row in one pass
// ==========================================

use crate::domain::import::{ImportRow, RowError};
use crate::domain::types::{ProductCategory, RowErrorKind};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use rust_decimal::Decimal;
use tracing::debug;

// ==========================================
// RowValidator
// ==========================================
// Duplicate detection queries the gateway on the connection that holds the
// open chunk transaction, so rows created earlier in the same chunk are
// already visible here.
pub struct RowValidator;

impl RowValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run every check and collect the failures
    ///
    /// An empty vector means the row may be created. Gateway errors during
    /// the duplicate lookup propagate (they are system failures, not
    /// validation results).
    pub async fn validate(
        &self,
        row: &ImportRow,
        tenant_id: &str,
        repo: &dyn CatalogRepository,
    ) -> RepositoryResult<Vec<RowError>> {
        let mut errors = Vec::new();

        // ===== Step 1: mandatory fields =====
        if row.code.is_none() {
            errors.push(RowError::new(
                row,
                "code",
                None,
                RowErrorKind::MissingMandatory,
                "product code is required",
                Some("fill the code column for this row".to_string()),
            ));
        }
        if row.name.is_none() {
            errors.push(RowError::new(
                row,
                "name",
                None,
                RowErrorKind::MissingMandatory,
                "product name is required",
                Some("fill the name column for this row".to_string()),
            ));
        }

        // ===== Step 2: quantity present and non-negative =====
        match row.quantity {
            None => {
                errors.push(RowError::new(
                    row,
                    "quantity",
                    None,
                    RowErrorKind::MissingMandatory,
                    "quantity is required",
                    Some("fill the quantity column with a non-negative number".to_string()),
                ));
            }
            Some(quantity) if quantity < Decimal::ZERO => {
                errors.push(RowError::new(
                    row,
                    "quantity",
                    Some(quantity.to_string()),
                    RowErrorKind::Validation,
                    "quantity must not be negative",
                    Some("use zero for out-of-stock products".to_string()),
                ));
            }
            Some(_) => {}
        }

        // ===== Step 3: optional numeric ranges =====
        if let Some(price) = row.price {
            if price < Decimal::ZERO {
                errors.push(RowError::new(
                    row,
                    "price",
                    Some(price.to_string()),
                    RowErrorKind::Validation,
                    "price must not be negative",
                    None,
                ));
            }
        }
        if let Some(min_stock) = row.min_stock_level {
            if min_stock < Decimal::ZERO {
                errors.push(RowError::new(
                    row,
                    "min_stock_level",
                    Some(min_stock.to_string()),
                    RowErrorKind::Validation,
                    "minimum stock level must not be negative",
                    None,
                ));
            }
        }

        // ===== Step 4: tenant-scoped code uniqueness =====
        if let Some(code) = &row.code {
            if repo.find_product_by_code(tenant_id, code).await?.is_some() {
                errors.push(RowError::new(
                    row,
                    "code",
                    Some(code.clone()),
                    RowErrorKind::Duplicate,
                    format!("a product with code '{}' already exists", code),
                    Some("remove the duplicate row or change its code".to_string()),
                ));
            }
        }

        // ===== Step 5: category text must be recognizable =====
        // Absent category is fine (defaults to MISC at creation); text that
        // parses to nothing is a hard error rather than a silent MISC.
        if let Some(category_text) = &row.category {
            if ProductCategory::parse(category_text).is_none() {
                errors.push(RowError::new(
                    row,
                    "category",
                    Some(category_text.clone()),
                    RowErrorKind::CategoryError,
                    format!("unrecognized category '{}'", category_text),
                    Some(format!(
                        "use one of: {}",
                        ProductCategory::supported_list()
                    )),
                ));
            }
        }

        if !errors.is_empty() {
            debug!(
                "row {} failed validation with {} error(s)",
                row.row_number,
                errors.len()
            );
        }
        Ok(errors)
    }
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new()
    }
}
