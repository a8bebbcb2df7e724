// ==========================================
// Product Catalog Import - Product domain model
// ==========================================
// Responsibility: entities the importer creates
// Red line: tenant_id scopes every entity; code is unique per tenant
// ==========================================

use crate::domain::types::{InventoryStatus, ProductCategory};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Product - catalog entry
// ==========================================
// Written by the import layer; read-only for everything downstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    // ===== Identity =====
    pub product_id: String,          // UUID
    pub tenant_id: String,           // owning account scope
    pub code: String,                // unique per tenant
    pub name: String,

    // ===== Optional descriptors =====
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub manufacturer: Option<String>,
    pub upc: Option<String>,
    pub manufacturer_code: Option<String>,

    // ===== Stock policy =====
    pub min_stock_level: Decimal,    // defaults to zero when absent

    // ===== Classification =====
    pub category: ProductCategory,   // defaults to MISC when absent
    pub family_id: Option<String>,   // resolved grouping, if a family was named

    // ===== Flags =====
    pub apply_tax: bool,             // default false
    pub visible: bool,               // default true (visible to customers)

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ProductFamily - named product grouping
// ==========================================
// Resolved by case-insensitive containment match, created on demand.
// name_norm backs the per-tenant uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFamily {
    pub family_id: String,           // UUID
    pub tenant_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ProductFamily {
    /// Normalized form used for the tenant-scoped uniqueness constraint
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

// ==========================================
// InventoryRecord - initial stock of a created product
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub inventory_id: String,        // UUID
    pub product_id: String,
    pub tenant_id: String,
    pub quantity: Decimal,           // scale preserved from the source cell
    pub status: InventoryStatus,     // OUT_OF_STOCK iff quantity is exactly zero
    pub created_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Status rule: a quantity of exactly zero is OUT_OF_STOCK, anything
    /// above zero is AVAILABLE
    pub fn status_for_quantity(quantity: Decimal) -> InventoryStatus {
        if quantity.is_zero() {
            InventoryStatus::OutOfStock
        } else {
            InventoryStatus::Available
        }
    }
}
