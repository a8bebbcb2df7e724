// ==========================================
// Product Catalog Import - Catalog schema bootstrap
// ==========================================
// Responsibility: idempotent table creation for the SQLite catalog
// Used by the CLI at startup and by the test helpers
// ==========================================

use rusqlite::Connection;

/// Create the catalog tables when they do not exist yet
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS product_families (
            family_id   TEXT PRIMARY KEY,
            tenant_id   TEXT NOT NULL,
            name        TEXT NOT NULL,
            name_norm   TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(tenant_id, name_norm)
        );

        CREATE TABLE IF NOT EXISTS products (
            product_id        TEXT PRIMARY KEY,
            tenant_id         TEXT NOT NULL,
            code              TEXT NOT NULL,
            name              TEXT NOT NULL,
            description       TEXT,
            price             TEXT,
            manufacturer      TEXT,
            upc               TEXT,
            manufacturer_code TEXT,
            min_stock_level   TEXT NOT NULL,
            category          TEXT NOT NULL,
            family_id         TEXT REFERENCES product_families(family_id),
            apply_tax         INTEGER NOT NULL DEFAULT 0,
            visible           INTEGER NOT NULL DEFAULT 1,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL,
            UNIQUE(tenant_id, code)
        );

        CREATE INDEX IF NOT EXISTS idx_products_tenant_code
            ON products(tenant_id, code);

        CREATE TABLE IF NOT EXISTS inventory (
            inventory_id TEXT PRIMARY KEY,
            product_id   TEXT NOT NULL REFERENCES products(product_id),
            tenant_id    TEXT NOT NULL,
            quantity     TEXT NOT NULL,
            status       TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_jobs (
            job_id           TEXT PRIMARY KEY,
            tenant_id        TEXT NOT NULL,
            status           TEXT NOT NULL,
            phase            TEXT,
            file_name        TEXT,
            file_size        INTEGER,
            total_rows       INTEGER NOT NULL DEFAULT 0,
            processed_rows   INTEGER NOT NULL DEFAULT 0,
            success_rows     INTEGER NOT NULL DEFAULT 0,
            error_rows       INTEGER NOT NULL DEFAULT 0,
            cancel_requested INTEGER NOT NULL DEFAULT 0,
            started_at       TEXT,
            finished_at      TEXT,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_row_outcomes (
            outcome_id      TEXT PRIMARY KEY,
            job_id          TEXT NOT NULL REFERENCES import_jobs(job_id),
            row_number      INTEGER NOT NULL,
            data_row_number INTEGER NOT NULL,
            success         INTEGER NOT NULL,
            product_id      TEXT,
            product_code    TEXT,
            errors_json     TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_row_outcomes_job
            ON import_row_outcomes(job_id);
        "#,
    )
}
