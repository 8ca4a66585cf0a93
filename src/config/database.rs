//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! The products table is generated from the entity definition with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust model
//! without hand-written SQL.

use crate::entities::Product;
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Connection target used when neither config.toml nor `DATABASE_URL` names one.
///
/// `mode=rwc` lets `SQLite` create the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://test.db?mode=rwc";

/// Opens the store at `database_url`.
///
/// Callers treat a failure here as fatal: nothing else in the service works
/// without the connection.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(|e| Error::StorageUnavailable {
        message: format!("Failed to open database at {database_url}: {e}"),
    })
}

/// Creates the products table if it does not exist yet.
///
/// Safe to call on every start; an existing table and its rows are left untouched.
#[instrument(skip(db))]
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    info!("Products table ensured");

    Ok(())
}
