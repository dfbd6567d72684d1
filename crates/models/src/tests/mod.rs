/// Database connection and configuration tests
pub mod db_tests;

/// CRUD operations tests for the catalog, order and service entities
pub mod crud_tests;

/// Transaction handling tests
pub mod transaction_tests;

use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Connect and migrate; `None` when DB tests are disabled or no URL is configured.
pub(crate) async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = crate::db::connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}
