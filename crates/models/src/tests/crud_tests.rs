use anyhow::Result;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::setup_test_db;
use crate::{address, order, order_item, product, product_category, user, user_credentials, OrderStatus, UserRole};

fn new_user(role: UserRole) -> user::NewUser {
    user::NewUser {
        email: format!("Crud_{}@Example.com", Uuid::new_v4()),
        name: "Crud User".into(),
        phone: Some("9876543210".into()),
        role,
        is_staff: false,
    }
}

#[tokio::test]
async fn test_user_create_normalizes_email_and_rejects_duplicate() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let input = new_user(UserRole::Customer);
    let created = user::create(&db, input.clone()).await?;
    assert_eq!(created.email, input.email.to_lowercase());
    assert!(created.is_active);

    let found = user::find_by_email(&db, &input.email.to_uppercase()).await?;
    assert_eq!(found.map(|u| u.id), Some(created.id));

    assert!(user::create(&db, input).await.is_err());

    let deactivated = user::set_active(&db, created.id, false).await?;
    assert!(!deactivated.is_active);

    user::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_credentials_upsert_replaces_hash() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let u = user::create(&db, new_user(UserRole::Technician)).await?;
    let first = user_credentials::upsert_password(&db, u.id, "hash-one".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-two".into(), "argon2").await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.password_hash, "hash-two");
    assert!(user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await.is_err());

    // credentials cascade with the user
    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(user_credentials::find_by_user(&db, u.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_order_with_items_round_trip() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let now = Utc::now();

    let customer = user::create(&db, new_user(UserRole::Customer)).await?;
    let addr = address::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(customer.id),
        street_address: Set("12 MG Road".into()),
        city: Set("Bengaluru".into()),
        state: Set("KA".into()),
        pincode: Set("560001".into()),
        is_default: Set(true),
        created_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    let suffix = Uuid::new_v4().simple().to_string();
    let cat = product_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Cat {suffix}")),
        slug: Set(format!("cat-{suffix}")),
    }
    .insert(&db)
    .await?;
    let prod = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(cat.id),
        name: Set("Water Purifier".into()),
        slug: Set(format!("water-purifier-{suffix}")),
        description: Set("RO+UV".into()),
        price: Set(dec!(8999.00)),
        image_url: Set(String::new()),
        stock: Set(5),
        delivery_time_info: Set(String::new()),
        brand: Set(String::new()),
        model_number: Set(String::new()),
        weight: Set(None),
        dimensions: Set(String::new()),
        warranty_period: Set("1 Year".into()),
        features: Set("RO, UV ,".into()),
        meta_description: Set(String::new()),
        is_featured: Set(false),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    assert_eq!(prod.features_list(), vec!["RO", "UV"]);

    let o = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(Some(customer.id)),
        technician_id: Set(None),
        shipping_address_id: Set(Some(addr.id)),
        status: Set(OrderStatus::Pending),
        stock_reserved: Set(false),
        order_date: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    order_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(o.id),
        product_id: Set(prod.id),
        quantity: Set(2),
        price: Set(prod.price),
    }
    .insert(&db)
    .await?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(o.id))
        .find_also_related(product::Entity)
        .all(&db)
        .await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].1.as_ref().map(|p| p.id), Some(prod.id));
    let plain: Vec<order_item::Model> = items.into_iter().map(|(i, _)| i).collect();
    assert_eq!(order_item::total_amount(&plain), dec!(17998.00));

    let stored = order::Entity::find_by_id(o.id).one(&db).await?.expect("order");
    assert_eq!(stored.status, OrderStatus::Pending);

    order::Entity::delete_by_id(o.id).exec(&db).await?;
    product::Entity::delete_by_id(prod.id).exec(&db).await?;
    product_category::Entity::delete_by_id(cat.id).exec(&db).await?;
    user::Entity::delete_by_id(customer.id).exec(&db).await?;
    Ok(())
}
