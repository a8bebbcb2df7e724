// ==========================================
// Product Catalog Import - Catalog Repository (rusqlite)
// ==========================================
// Responsibility: SQLite-backed persistence gateway
// Concurrency: one connection behind a mutex; the job ledger shares the
// same connection so ledger writes never block on an open chunk
// transaction
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::{InventoryRecord, Product, ProductFamily};
use crate::domain::types::ProductCategory;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// CatalogRepositoryImpl
// ==========================================
pub struct CatalogRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepositoryImpl {
    /// Open a dedicated connection to the catalog database
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (same-connection visibility with the
    /// job ledger during an open chunk)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::LockError("connection mutex poisoned".to_string()))
    }

    fn map_product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        let price: Option<String> = row.get("price")?;
        let min_stock: String = row.get("min_stock_level")?;
        let category: String = row.get("category")?;
        let apply_tax: i64 = row.get("apply_tax")?;
        let visible: i64 = row.get("visible")?;

        Ok(Product {
            product_id: row.get("product_id")?,
            tenant_id: row.get("tenant_id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: price.and_then(|p| Decimal::from_str(&p).ok()),
            manufacturer: row.get("manufacturer")?,
            upc: row.get("upc")?,
            manufacturer_code: row.get("manufacturer_code")?,
            min_stock_level: Decimal::from_str(&min_stock).unwrap_or(Decimal::ZERO),
            category: ProductCategory::from_str_db(&category),
            family_id: row.get("family_id")?,
            apply_tax: apply_tax != 0,
            visible: visible != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn map_family_row(row: &Row<'_>) -> rusqlite::Result<ProductFamily> {
        Ok(ProductFamily {
            family_id: row.get("family_id")?,
            tenant_id: row.get("tenant_id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    fn find_family_containing(
        conn: &Connection,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<Option<ProductFamily>> {
        let family = conn
            .query_row(
                r#"
                SELECT family_id, tenant_id, name, created_at
                FROM product_families
                WHERE tenant_id = ?1 AND instr(lower(name), lower(?2)) > 0
                ORDER BY rowid
                LIMIT 1
                "#,
                params![tenant_id, name.trim()],
                Self::map_family_row,
            )
            .optional()?;
        Ok(family)
    }

    fn find_family_by_norm(
        conn: &Connection,
        tenant_id: &str,
        name_norm: &str,
    ) -> RepositoryResult<Option<ProductFamily>> {
        let family = conn
            .query_row(
                r#"
                SELECT family_id, tenant_id, name, created_at
                FROM product_families
                WHERE tenant_id = ?1 AND name_norm = ?2
                "#,
                params![tenant_id, name_norm],
                Self::map_family_row,
            )
            .optional()?;
        Ok(family)
    }

    fn insert_family(conn: &Connection, family: &ProductFamily) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO product_families (family_id, tenant_id, name, name_norm, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                family.family_id,
                family.tenant_id,
                family.name,
                ProductFamily::normalize_name(&family.name),
                family.created_at,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn find_product_by_code(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> RepositoryResult<Option<Product>> {
        let conn = self.lock()?;
        let product = conn
            .query_row(
                "SELECT * FROM products WHERE tenant_id = ?1 AND code = ?2",
                params![tenant_id, code],
                Self::map_product_row,
            )
            .optional()?;
        Ok(product)
    }

    async fn create_product(&self, product: &Product) -> RepositoryResult<String> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO products (
                product_id, tenant_id, code, name, description, price,
                manufacturer, upc, manufacturer_code, min_stock_level,
                category, family_id, apply_tax, visible, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                product.product_id,
                product.tenant_id,
                product.code,
                product.name,
                product.description,
                product.price.map(|p| p.to_string()),
                product.manufacturer,
                product.upc,
                product.manufacturer_code,
                product.min_stock_level.to_string(),
                product.category.as_str(),
                product.family_id,
                product.apply_tax as i32,
                product.visible as i32,
                product.created_at,
                product.updated_at,
            ],
        )?;
        Ok(product.product_id.clone())
    }

    async fn create_inventory(&self, inventory: &InventoryRecord) -> RepositoryResult<String> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO inventory (inventory_id, product_id, tenant_id, quantity, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                inventory.inventory_id,
                inventory.product_id,
                inventory.tenant_id,
                inventory.quantity.to_string(),
                inventory.status.as_str(),
                inventory.created_at,
            ],
        )?;
        Ok(inventory.inventory_id.clone())
    }

    async fn find_family_by_name_like(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<Option<ProductFamily>> {
        let conn = self.lock()?;
        Self::find_family_containing(&conn, tenant_id, name)
    }

    async fn create_family(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<ProductFamily> {
        let conn = self.lock()?;
        let family = ProductFamily {
            family_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };
        Self::insert_family(&conn, &family)?;
        Ok(family)
    }

    async fn get_or_create_family(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<ProductFamily> {
        // Read and conditional write under one lock scope; the unique
        // constraint on (tenant_id, name_norm) covers concurrent jobs on
        // other connections.
        let conn = self.lock()?;

        if let Some(existing) = Self::find_family_containing(&conn, tenant_id, name)? {
            return Ok(existing);
        }

        let family = ProductFamily {
            family_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        match Self::insert_family(&conn, &family) {
            Ok(()) => Ok(family),
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                // Lost the creation race: re-read the winner's row
                let norm = ProductFamily::normalize_name(name);
                Self::find_family_by_norm(&conn, tenant_id, &norm)?.ok_or_else(|| {
                    RepositoryError::NotFound {
                        entity: "ProductFamily".to_string(),
                        id: norm,
                    }
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn begin_chunk(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    async fn commit_chunk(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    async fn rollback_chunk(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::init_schema;

    fn repo() -> CatalogRepositoryImpl {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        CatalogRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn sample_product(tenant: &str, code: &str) -> Product {
        Product {
            product_id: Uuid::new_v4().to_string(),
            tenant_id: tenant.to_string(),
            code: code.to_string(),
            name: "Widget".to_string(),
            description: None,
            price: Some(Decimal::from_str("2.50").unwrap()),
            manufacturer: None,
            upc: None,
            manufacturer_code: None,
            min_stock_level: Decimal::ZERO,
            category: ProductCategory::Misc,
            family_id: None,
            apply_tax: false,
            visible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_product_round_trip() {
        let repo = repo();
        let product = sample_product("t1", "A1");
        repo.create_product(&product).await.unwrap();

        let found = repo.find_product_by_code("t1", "A1").await.unwrap().unwrap();
        assert_eq!(found.code, "A1");
        assert_eq!(found.price, Some(Decimal::from_str("2.50").unwrap()));
        assert_eq!(found.category, ProductCategory::Misc);

        // Codes are tenant-scoped
        assert!(repo.find_product_by_code("t2", "A1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_per_tenant() {
        let repo = repo();
        repo.create_product(&sample_product("t1", "A1")).await.unwrap();

        let result = repo.create_product(&sample_product("t1", "A1")).await;
        assert!(matches!(
            result,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));

        // Same code under another tenant is fine
        repo.create_product(&sample_product("t2", "A1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_or_create_family_idempotent() {
        let repo = repo();
        let first = repo.get_or_create_family("t1", "Kitchen").await.unwrap();
        let second = repo.get_or_create_family("t1", "Kitchen").await.unwrap();
        assert_eq!(first.family_id, second.family_id);

        // Case-insensitive containment also resolves to the same family
        let third = repo.get_or_create_family("t1", "kitchen").await.unwrap();
        assert_eq!(first.family_id, third.family_id);
    }

    #[tokio::test]
    async fn test_family_containment_match_lowest_rowid() {
        let repo = repo();
        let kitchen = repo.create_family("t1", "Kitchen Premium").await.unwrap();
        repo.create_family("t1", "Kitchen Basic").await.unwrap();

        let found = repo
            .find_family_by_name_like("t1", "kitchen")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.family_id, kitchen.family_id);
    }

    #[tokio::test]
    async fn test_chunk_rollback_discards_writes() {
        let repo = repo();
        repo.begin_chunk().await.unwrap();
        repo.create_product(&sample_product("t1", "A1")).await.unwrap();
        repo.rollback_chunk().await.unwrap();

        assert!(repo.find_product_by_code("t1", "A1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uncommitted_chunk_visible_to_reads() {
        let repo = repo();
        repo.begin_chunk().await.unwrap();
        repo.create_product(&sample_product("t1", "A1")).await.unwrap();

        // Same-connection read sees the uncommitted row
        let found = repo.find_product_by_code("t1", "A1").await.unwrap();
        assert!(found.is_some());

        repo.commit_chunk().await.unwrap();
    }
}
