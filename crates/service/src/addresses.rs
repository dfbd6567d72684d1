use chrono::Utc;
use models::address;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub is_default: Option<bool>,
}

/// Default address first, then newest.
pub async fn list_addresses(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<address::Model>, ServiceError> {
    Ok(address::Entity::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_desc(address::Column::IsDefault)
        .order_by_desc(address::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Loads an address only if it belongs to `user_id`; anything else is reported as missing.
pub async fn find_owned<C: ConnectionTrait>(db: &C, user_id: Uuid, id: Uuid) -> Result<address::Model, ServiceError> {
    address::Entity::find_by_id(id)
        .filter(address::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Address"))
}

async fn clear_defaults<C: ConnectionTrait>(db: &C, user_id: Uuid, except: Uuid) -> Result<(), ServiceError> {
    address::Entity::update_many()
        .col_expr(address::Column::IsDefault, sea_orm::sea_query::Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::Id.ne(except))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn create_address(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: AddressInput,
) -> Result<address::Model, ServiceError> {
    address::validate_fields(&input.street_address, &input.city, &input.state, &input.pincode)?;
    let txn = db.begin().await?;
    let created = address::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        street_address: Set(input.street_address.trim().to_string()),
        city: Set(input.city.trim().to_string()),
        state: Set(input.state.trim().to_string()),
        pincode: Set(input.pincode),
        is_default: Set(input.is_default),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    if created.is_default {
        clear_defaults(&txn, user_id, created.id).await?;
    }
    txn.commit().await?;
    info!(%user_id, address_id = %created.id, is_default = created.is_default, "address_created");
    Ok(created)
}

pub async fn update_address(
    db: &DatabaseConnection,
    user_id: Uuid,
    id: Uuid,
    patch: AddressPatch,
) -> Result<address::Model, ServiceError> {
    let txn = db.begin().await?;
    let existing = find_owned(&txn, user_id, id).await?;
    let street = patch.street_address.unwrap_or_else(|| existing.street_address.clone());
    let city = patch.city.unwrap_or_else(|| existing.city.clone());
    let state = patch.state.unwrap_or_else(|| existing.state.clone());
    let pincode = patch.pincode.unwrap_or_else(|| existing.pincode.clone());
    address::validate_fields(&street, &city, &state, &pincode)?;

    let mut am: address::ActiveModel = existing.into();
    am.street_address = Set(street.trim().to_string());
    am.city = Set(city.trim().to_string());
    am.state = Set(state.trim().to_string());
    am.pincode = Set(pincode);
    if let Some(flag) = patch.is_default {
        am.is_default = Set(flag);
    }
    let updated = am.update(&txn).await?;
    if updated.is_default {
        clear_defaults(&txn, user_id, updated.id).await?;
    }
    txn.commit().await?;
    Ok(updated)
}

/// Removing the default address promotes the newest remaining one.
pub async fn delete_address(db: &DatabaseConnection, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let target = find_owned(&txn, user_id, id).await?;
    let others: Vec<address::Model> = address::Entity::find()
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::Id.ne(id))
        .order_by_desc(address::Column::CreatedAt)
        .all(&txn)
        .await?;
    if target.is_default && others.is_empty() {
        return Err(ServiceError::validation("Cannot delete the only address"));
    }
    address::Entity::delete_by_id(id).exec(&txn).await?;
    if target.is_default && !others.iter().any(|a| a.is_default) {
        if let Some(next) = others.into_iter().next() {
            let mut am: address::ActiveModel = next.into();
            am.is_default = Set(true);
            am.update(&txn).await?;
        }
    }
    txn.commit().await?;
    info!(%user_id, address_id = %id, "address_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_user, skip_db};
    use models::UserRole;

    fn input(is_default: bool) -> AddressInput {
        AddressInput {
            street_address: "7 MG Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
            is_default,
        }
    }

    #[tokio::test]
    async fn single_default_and_promotion_on_delete() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let u = make_user(&db, UserRole::Customer).await?;

        let first = create_address(&db, u.id, input(true)).await?;
        let second = create_address(&db, u.id, input(true)).await?;
        let all = list_addresses(&db, u.id).await?;
        assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(all[0].id, second.id);

        delete_address(&db, u.id, second.id).await?;
        let remaining = list_addresses(&db, u.id).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, first.id);
        assert!(remaining[0].is_default);

        let err = delete_address(&db, u.id, first.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete the only address");
        Ok(())
    }

    #[tokio::test]
    async fn other_users_addresses_are_invisible() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let owner = make_user(&db, UserRole::Customer).await?;
        let other = make_user(&db, UserRole::Customer).await?;
        let addr = create_address(&db, owner.id, input(false)).await?;

        let res = update_address(&db, other.id, addr.id, AddressPatch { city: Some("Goa".into()), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));

        let bad_pin = update_address(&db, owner.id, addr.id, AddressPatch { pincode: Some("12".into()), ..Default::default() }).await;
        assert!(bad_pin.is_err());
        Ok(())
    }
}
