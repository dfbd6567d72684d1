use anyhow::Result;
use sea_orm::{EntityTrait, TransactionTrait};
use uuid::Uuid;

use super::setup_test_db;
use crate::{user, UserRole};

#[tokio::test]
async fn test_rollback_discards_insert() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let txn = db.begin().await?;
    let u = user::create(
        &txn,
        user::NewUser {
            email: format!("txn_{}@example.com", Uuid::new_v4()),
            name: "Txn".into(),
            phone: None,
            role: UserRole::Customer,
            is_staff: false,
        },
    )
    .await?;
    txn.rollback().await?;

    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
    Ok(())
}
