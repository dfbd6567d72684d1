use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use super::setup_test_db;

#[tokio::test]
async fn test_connection_and_ping() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    db.ping().await?;
    let row = db
        .query_one(Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 AS one".to_string()))
        .await?
        .expect("one row");
    let one: i32 = row.try_get("", "one")?;
    assert_eq!(one, 1);
    Ok(())
}

#[test]
fn test_database_config_falls_back_to_env_url() {
    std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");
    let cfg = crate::db::database_config();
    assert!(cfg.url.starts_with("postgres"));
    assert!(cfg.max_connections >= cfg.min_connections);
}
