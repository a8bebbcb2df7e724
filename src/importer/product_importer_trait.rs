// ==========================================
// Product Catalog Import - Importer Trait
// ==========================================
// Responsibility: the public import surface
// ==========================================

use crate::domain::import::ImportReport;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ProductImporter Trait
// ==========================================
// Implementor: ProductImporterImpl
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// Import an Excel workbook (.xlsx / .xls)
    async fn import_from_excel(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport>;

    /// Import a CSV file
    async fn import_from_csv(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> ImportResult<ImportReport>;

    /// Import any supported file, picking the source by extension
    async fn import_file(&self, file_path: &str, tenant_id: &str)
        -> ImportResult<ImportReport>;

    /// Import several files, one independent result each
    ///
    /// Files sharing one repository connection are processed sequentially;
    /// jobs that should truly run in parallel need their own connections,
    /// since a chunk transaction owns its connection until commit.
    async fn batch_import(
        &self,
        file_paths: &[String],
        tenant_id: &str,
    ) -> Vec<ImportResult<ImportReport>>;
}
