//! Shared test utilities.
//!
//! Helpers for setting up in-memory test databases, creating products with
//! sensible defaults, and standing up the full HTTP stack.

use crate::{
    api::{self, AppState},
    core::product::{self, ProductDraft},
    entities,
    errors::Result,
};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with the products table in place.
/// This is the standard setup for all storage tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::ensure_schema(&db).await?;
    Ok(db)
}

/// Same as [`setup_test_db`], with the ten seed products inserted.
pub async fn setup_seeded_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    product::seed_if_empty(&db).await?;
    Ok(db)
}

/// Creates a test product with the given code.
///
/// # Defaults
/// * price: 10
pub async fn create_test_product(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::product::Model> {
    product::save(db, ProductDraft::new(code, 10)).await
}

/// Builds the full router (correlation middleware included) over `db`
/// and wraps it in a test server.
#[allow(clippy::unwrap_used)]
pub fn test_server(db: DatabaseConnection) -> TestServer {
    TestServer::new(api::router(AppState::new(db))).unwrap()
}

/// Sets up an empty store and a test server over it.
/// Returns (server, db) so tests can inspect storage directly.
pub async fn setup_test_server() -> Result<(TestServer, DatabaseConnection)> {
    let db = setup_test_db().await?;
    Ok((test_server(db.clone()), db))
}
