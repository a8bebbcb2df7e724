// ==========================================
// Product Catalog Import - Domain value types
// ==========================================
// Responsibility: enumerations shared across layers
// Serialization: UPPER_SNAKE string form in the database
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ProductCategory
// ==========================================
// Parsing is an explicit result (Option), never an exception: an
// unrecognized category is reported by the validator, while an absent
// category defaults to Misc at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Electronics,
    Computers,
    MobilePhones,
    Clothing,
    Groceries,
    Books,
    Toys,
    Misc,
}

impl ProductCategory {
    /// Every supported category, in display order
    pub const ALL: [ProductCategory; 8] = [
        ProductCategory::Electronics,
        ProductCategory::Computers,
        ProductCategory::MobilePhones,
        ProductCategory::Clothing,
        ProductCategory::Groceries,
        ProductCategory::Books,
        ProductCategory::Toys,
        ProductCategory::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "ELECTRONICS",
            ProductCategory::Computers => "COMPUTERS",
            ProductCategory::MobilePhones => "MOBILE_PHONES",
            ProductCategory::Clothing => "CLOTHING",
            ProductCategory::Groceries => "GROCERIES",
            ProductCategory::Books => "BOOKS",
            ProductCategory::Toys => "TOYS",
            ProductCategory::Misc => "MISC",
        }
    }

    /// Parse free text into a category
    ///
    /// Normalization: uppercase, spaces and hyphens folded to underscore.
    /// Direct enum match first, then the multilingual alias table.
    /// Returns None for anything unrecognized.
    pub fn parse(text: &str) -> Option<ProductCategory> {
        let key = text.trim().to_uppercase().replace([' ', '-'], "_");
        if key.is_empty() {
            return None;
        }

        // Direct match against the enumeration
        for category in ProductCategory::ALL {
            if key == category.as_str() {
                return Some(category);
            }
        }

        // Alias table (EN/FR synonyms commonly seen in source files)
        match key.as_str() {
            "ELECTRONIC" | "ELECTRONIQUE" | "ELECTRONICA" => Some(ProductCategory::Electronics),
            "COMPUTER" | "ORDINATEUR" | "ORDENADOR" | "COMPUTADOR" => {
                Some(ProductCategory::Computers)
            }
            "MOBILE" | "PHONE" | "TELEPHONE" | "TELEFONO" | "TELEFONE" => {
                Some(ProductCategory::MobilePhones)
            }
            "CLOTHES" | "CLOTHING" | "VETEMENT" | "ROPA" | "ROUPA" => {
                Some(ProductCategory::Clothing)
            }
            "FOOD" | "GROCERY" | "ALIMENTATION" | "ALIMENTOS" => Some(ProductCategory::Groceries),
            "BOOK" | "LIVRE" | "LIBRO" | "LIVRO" => Some(ProductCategory::Books),
            "TOY" | "JOUET" | "JUGUETE" | "BRINQUEDO" => Some(ProductCategory::Toys),
            _ => None,
        }
    }

    pub fn from_str_db(raw: &str) -> ProductCategory {
        ProductCategory::parse(raw).unwrap_or(ProductCategory::Misc)
    }

    /// Supported values, for validation messages
    pub fn supported_list() -> String {
        ProductCategory::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// InventoryStatus
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryStatus {
    Available,
    OutOfStock,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Available => "AVAILABLE",
            InventoryStatus::OutOfStock => "OUT_OF_STOCK",
        }
    }

    pub fn from_str_db(raw: &str) -> InventoryStatus {
        match raw {
            "OUT_OF_STOCK" => InventoryStatus::OutOfStock,
            _ => InventoryStatus::Available,
        }
    }
}

// ==========================================
// JobStatus
// ==========================================
// Lifecycle: QUEUED -> PROCESSING -> COMPLETED / FAILED / CANCELLED
// A job that finished with every row rejected is still COMPLETED; only
// structural errors produce FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str_db(raw: &str) -> JobStatus {
        match raw {
            "PROCESSING" => JobStatus::Processing,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            _ => JobStatus::Queued,
        }
    }
}

// ==========================================
// RowErrorKind
// ==========================================
// Classification of a per-row import failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowErrorKind {
    Validation,
    Duplicate,
    BusinessRule,
    System,
    MissingMandatory,
    InvalidFormat,
    FamilyError,
    CategoryError,
}

impl RowErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowErrorKind::Validation => "VALIDATION",
            RowErrorKind::Duplicate => "DUPLICATE",
            RowErrorKind::BusinessRule => "BUSINESS_RULE",
            RowErrorKind::System => "SYSTEM",
            RowErrorKind::MissingMandatory => "MISSING_MANDATORY",
            RowErrorKind::InvalidFormat => "INVALID_FORMAT",
            RowErrorKind::FamilyError => "FAMILY_ERROR",
            RowErrorKind::CategoryError => "CATEGORY_ERROR",
        }
    }
}
