// ==========================================
// Product Catalog Import - CLI entry
// ==========================================
// Usage: catalog-import <file> --tenant <id> [--db <path>]
// ==========================================

use catalog_import::config::ImportConfig;
use catalog_import::db::open_sqlite_connection;
use catalog_import::importer::{ProductImporter, ProductImporterImpl};
use catalog_import::repository::{
    init_schema, CatalogRepositoryImpl, ImportJobRepositoryImpl,
};
use catalog_import::{logging, APP_NAME, VERSION};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

struct CliArgs {
    file: String,
    tenant: String,
    db_path: String,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut file = None;
    let mut tenant = None;
    let mut db_path = "catalog.db".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tenant" => {
                tenant = Some(args.next().ok_or("--tenant requires a value")?);
            }
            "--db" => {
                db_path = args.next().ok_or("--db requires a value")?;
            }
            "--help" | "-h" => {
                return Err(format!(
                    "{} {}\nusage: catalog-import <file> --tenant <id> [--db <path>]",
                    APP_NAME, VERSION
                ));
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option: {}", other));
            }
            other => {
                if file.is_some() {
                    return Err("only one input file is accepted".to_string());
                }
                file = Some(other.to_string());
            }
        }
    }

    Ok(CliArgs {
        file: file.ok_or("missing input file")?,
        tenant: tenant.ok_or("missing --tenant <id>")?,
        db_path,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    info!("{} v{} starting", APP_NAME, VERSION);

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    // One shared connection: catalog writes and job ledger updates live in
    // the same SQLite session, so ledger writes join the open chunk
    // transaction instead of blocking on it.
    let conn = match open_sqlite_connection(&args.db_path) {
        Ok(conn) => conn,
        Err(e) => {
            error!("failed to open database {}: {}", args.db_path, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_schema(&conn) {
        error!("failed to initialize schema: {}", e);
        return ExitCode::FAILURE;
    }
    let conn = Arc::new(Mutex::new(conn));

    let repo = Arc::new(CatalogRepositoryImpl::from_connection(conn.clone()));
    let ledger = Arc::new(ImportJobRepositoryImpl::from_connection(conn));
    let importer = ProductImporterImpl::new(repo, ledger, ImportConfig::default());

    match importer.import_file(&args.file, &args.tenant).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("failed to serialize report: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("import failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
