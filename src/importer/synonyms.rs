// ==========================================
// Product Catalog Import - Header synonym dictionary
// ==========================================
// Responsibility: logical field -> multilingual column-name synonyms
// Locales: English / French / Spanish / Portuguese
// Note: immutable value injected into the detector, extensible per locale
// without touching the matching code
// ==========================================

use crate::domain::import::LogicalField;
use std::collections::{HashMap, HashSet};

/// Fold common Latin accents to their ASCII base letter
///
/// Covers the accented characters the supported locales actually use in
/// column headings; anything else passes through unchanged.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        _ => c,
    }
}

/// Normalize a header cell for dictionary matching
///
/// Lowercase, accent fold, runs of whitespace/punctuation collapsed to a
/// single underscore, leading/trailing underscores trimmed.
pub fn normalize_header(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

// ==========================================
// SynonymDictionary
// ==========================================
#[derive(Debug, Clone)]
pub struct SynonymDictionary {
    entries: HashMap<LogicalField, HashSet<String>>,
}

impl SynonymDictionary {
    /// Empty dictionary; callers normally start from `default()`
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add synonyms for a field (normalized on the way in)
    pub fn with_synonyms<I, S>(mut self, field: LogicalField, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.entries.entry(field).or_default();
        for synonym in synonyms {
            set.insert(normalize_header(synonym.as_ref()));
        }
        self
    }

    /// Exact set membership for a normalized header cell
    pub fn matches_exact(&self, field: LogicalField, normalized: &str) -> bool {
        self.entries
            .get(&field)
            .map(|set| set.contains(normalized))
            .unwrap_or(false)
    }

    /// Substring containment in either direction, fallback after exact
    pub fn matches_fuzzy(&self, field: LogicalField, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }
        self.entries
            .get(&field)
            .map(|set| {
                set.iter()
                    .any(|s| normalized.contains(s.as_str()) || s.contains(normalized))
            })
            .unwrap_or(false)
    }
}

impl Default for SynonymDictionary {
    /// The built-in EN/FR/ES/PT table
    fn default() -> Self {
        SynonymDictionary::new()
            .with_synonyms(
                LogicalField::Code,
                [
                    "code", "product code", "sku", "reference", "ref",
                    "code produit", "codigo", "código", "referencia",
                    "codigo produto",
                ],
            )
            .with_synonyms(
                LogicalField::Name,
                [
                    "name", "product name", "title", "designation",
                    "nom", "nom produit", "libellé", "libelle",
                    "nombre", "nome", "titulo",
                ],
            )
            .with_synonyms(
                LogicalField::Quantity,
                [
                    "quantity", "qty", "stock", "stock quantity",
                    "quantité", "quantite", "qté", "qte",
                    "cantidad", "quantidade",
                ],
            )
            .with_synonyms(
                LogicalField::Family,
                [
                    "family", "product family", "famille", "famille produit",
                    "familia", "group", "groupe", "grupo",
                ],
            )
            .with_synonyms(
                LogicalField::Category,
                [
                    "category", "catégorie", "categorie", "categoria",
                    "rubrique", "tipo",
                ],
            )
            .with_synonyms(
                LogicalField::Price,
                [
                    "price", "unit price", "prix", "prix unitaire",
                    "precio", "preço", "preco", "tarif",
                ],
            )
            .with_synonyms(
                LogicalField::Description,
                [
                    "description", "desc", "descripcion", "descrição",
                    "descricao", "details", "détails",
                ],
            )
            .with_synonyms(
                LogicalField::Manufacturer,
                [
                    "manufacturer", "brand", "maker", "marque", "fabricant",
                    "fabricante", "marca",
                ],
            )
            .with_synonyms(
                LogicalField::Upc,
                [
                    "upc", "ean", "gtin", "barcode", "code barre",
                    "code barres", "codigo barras", "código de barras",
                ],
            )
            .with_synonyms(
                LogicalField::ManufacturerCode,
                [
                    "manufacturer code", "mpn", "part number",
                    "ref fabricant", "référence fabricant",
                    "codigo fabricante", "referencia fabricante",
                ],
            )
            .with_synonyms(
                LogicalField::MinStockLevel,
                [
                    "min stock", "minimum stock", "min stock level",
                    "reorder level", "stock min", "stock minimum",
                    "seuil de stock", "stock minimo", "stock mínimo",
                    "estoque minimo",
                ],
            )
            .with_synonyms(
                LogicalField::ApplyTax,
                [
                    "tax", "apply tax", "taxable", "tva", "taxe",
                    "impuesto", "imposto",
                ],
            )
            .with_synonyms(
                LogicalField::Visible,
                [
                    "visible", "active", "published", "online",
                    "actif", "en ligne", "visible clients",
                    "activo", "ativo", "publicado",
                ],
            )
    }
}
