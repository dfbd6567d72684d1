//! Customer orders: placement, confirmation (stock reservation), cancellation and views.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use models::{address, order, order_item, product, technician_rating, user, OrderStatus};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::addresses::find_owned;
use crate::errors::ServiceError;
use crate::workflow;

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
    pub product_image: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub order_date: chrono::DateTime<chrono::FixedOffset>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub items: Vec<OrderItemView>,
    pub shipping_address_details: Option<address::Model>,
    pub technician_id: Option<Uuid>,
    pub technician_name: Option<String>,
    pub technician_phone: Option<String>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub can_rate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_slug: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 { 1 }

/// Expands order rows with items, address, people and rating eligibility.
pub async fn build_order_views<C: ConnectionTrait>(
    db: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderView>, ServiceError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids.clone()))
        .find_also_related(product::Entity)
        .all(db)
        .await?;
    let mut items_by_order: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
    let mut products: HashMap<Uuid, product::Model> = HashMap::new();
    for (item, p) in items {
        if let Some(p) = p {
            products.insert(p.id, p);
        }
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let address_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.shipping_address_id).collect();
    let addresses: HashMap<Uuid, address::Model> = address::Entity::find()
        .filter(address::Column::Id.is_in(address_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let people_ids: Vec<Uuid> = orders
        .iter()
        .flat_map(|o| [o.customer_id, o.technician_id])
        .flatten()
        .collect();
    let people: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(people_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let rated: HashSet<Uuid> = technician_rating::Entity::find()
        .filter(technician_rating::Column::OrderId.is_in(order_ids))
        .all(db)
        .await?
        .into_iter()
        .filter_map(|r| r.order_id)
        .collect();

    Ok(orders
        .into_iter()
        .map(|o| {
            let rows = items_by_order.remove(&o.id).unwrap_or_default();
            let total_amount = order_item::total_amount(&rows);
            let items = rows
                .into_iter()
                .map(|i| {
                    let p = products.get(&i.product_id);
                    OrderItemView {
                        id: i.id,
                        product_id: i.product_id,
                        product_name: p.map(|p| p.name.clone()).unwrap_or_default(),
                        product_slug: p.map(|p| p.slug.clone()).unwrap_or_default(),
                        product_image: p.map(|p| p.image_url.clone()).filter(|u| !u.is_empty()),
                        quantity: i.quantity,
                        price: i.price,
                    }
                })
                .collect();
            let technician = o.technician_id.and_then(|id| people.get(&id));
            let customer = o.customer_id.and_then(|id| people.get(&id));
            OrderView {
                id: o.id,
                order_date: o.order_date,
                status: o.status,
                total_amount,
                items,
                shipping_address_details: o.shipping_address_id.and_then(|id| addresses.get(&id).cloned()),
                technician_id: o.technician_id,
                technician_name: technician.map(|t| t.name.clone()),
                technician_phone: technician.and_then(|t| t.phone.clone()),
                customer_id: o.customer_id,
                customer_name: customer.map(|c| c.name.clone()),
                customer_phone: customer.and_then(|c| c.phone.clone()),
                customer_email: customer.map(|c| c.email.clone()),
                can_rate: workflow::can_rate_order(o.status, o.technician_id, rated.contains(&o.id)),
            }
        })
        .collect())
}

pub async fn order_view<C: ConnectionTrait>(db: &C, o: order::Model) -> Result<OrderView, ServiceError> {
    build_order_views(db, vec![o]).await?.pop().ok_or_else(|| ServiceError::not_found("Order"))
}

async fn find_own_order<C: ConnectionTrait>(db: &C, customer_id: Uuid, id: Uuid) -> Result<order::Model, ServiceError> {
    order::Entity::find_by_id(id)
        .filter(order::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order"))
}

async fn active_product_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<product::Model, ServiceError> {
    product::Entity::find()
        .filter(product::Column::Slug.eq(slug))
        .filter(product::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))
}

/// Single-product order; stock is checked here but only taken on confirmation.
pub async fn place_order(
    db: &DatabaseConnection,
    customer_id: Uuid,
    product_slug: &str,
    quantity: i32,
    address_id: Uuid,
) -> Result<OrderView, ServiceError> {
    if product_slug.trim().is_empty() {
        return Err(ServiceError::validation("Product and address are required"));
    }
    place_bulk_order(
        db,
        customer_id,
        address_id,
        vec![OrderLine { product_slug: product_slug.to_string(), quantity }],
    )
    .await
}

/// One order for many lines. Every line is validated before anything is written.
pub async fn place_bulk_order(
    db: &DatabaseConnection,
    customer_id: Uuid,
    address_id: Uuid,
    lines: Vec<OrderLine>,
) -> Result<OrderView, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::validation("Items and address are required"));
    }
    let single = lines.len() == 1;
    let txn = db.begin().await?;
    let address = find_owned(&txn, customer_id, address_id).await?;

    let mut validated = Vec::with_capacity(lines.len());
    for line in lines {
        if line.product_slug.trim().is_empty() {
            return Err(ServiceError::validation("Each item must include product_slug"));
        }
        if line.quantity < 1 {
            return Err(ServiceError::validation("Quantity must be at least 1"));
        }
        let p = active_product_by_slug(&txn, line.product_slug.trim()).await?;
        if p.stock < line.quantity {
            let msg = if single {
                format!("Only {} items available in stock", p.stock)
            } else {
                format!("Only {} items available in stock for {}", p.stock, p.name)
            };
            return Err(ServiceError::validation(msg));
        }
        validated.push((p, line.quantity));
    }

    let now = Utc::now();
    let created = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(Some(customer_id)),
        technician_id: Set(None),
        shipping_address_id: Set(Some(address.id)),
        status: Set(OrderStatus::Pending),
        stock_reserved: Set(false),
        order_date: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    for (p, quantity) in &validated {
        order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(created.id),
            product_id: Set(p.id),
            quantity: Set(*quantity),
            price: Set(p.price),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    info!(order_id = %created.id, %customer_id, lines = validated.len(), "order_placed");
    order_view(db, created).await
}

/// Takes stock for every line. A short line aborts the transaction and nothing changes.
async fn reserve_stock<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<(), ServiceError> {
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?;
    for item in items {
        let res = product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).sub(item.quantity))
            .col_expr(product::Column::UpdatedAt, Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())))
            .filter(product::Column::Id.eq(item.product_id))
            .filter(product::Column::Stock.gte(item.quantity))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            let p = product::Entity::find_by_id(item.product_id).one(db).await?;
            let (name, stock) = p.map(|p| (p.name, p.stock)).unwrap_or_default();
            return Err(ServiceError::validation(format!(
                "Only {stock} items available in stock for {name}"
            )));
        }
    }
    Ok(())
}

/// Gives back stock held by a confirmed order.
pub(crate) async fn release_stock<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<(), ServiceError> {
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?;
    for item in items {
        product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).add(item.quantity))
            .filter(product::Column::Id.eq(item.product_id))
            .exec(db)
            .await?;
    }
    Ok(())
}

/// Cancels an order, returning stock if it had been reserved. Used by customers and staff.
pub(crate) async fn cancel_in_txn<C: ConnectionTrait>(db: &C, o: order::Model) -> Result<order::Model, ServiceError> {
    if o.stock_reserved {
        release_stock(db, o.id).await?;
    }
    let mut am: order::ActiveModel = o.into();
    am.status = Set(OrderStatus::Cancelled);
    am.stock_reserved = Set(false);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Moves an order to another status on behalf of staff, keeping the stock
/// reservation in line: fulfilment statuses hold stock, PENDING and CANCELLED do not.
/// DELIVERED and CANCELLED orders are final.
pub(crate) async fn set_status_in_txn<C: ConnectionTrait>(
    db: &C,
    o: order::Model,
    status: OrderStatus,
) -> Result<order::Model, ServiceError> {
    if status == OrderStatus::Delivered {
        workflow::ensure_order_deliverable(o.status)?;
    } else {
        workflow::ensure_order_status_editable(o.status)?;
    }
    if status == OrderStatus::Cancelled {
        return cancel_in_txn(db, o).await;
    }
    let holds_stock = !matches!(status, OrderStatus::Pending);
    if holds_stock && !o.stock_reserved {
        reserve_stock(db, o.id).await?;
    } else if !holds_stock && o.stock_reserved {
        release_stock(db, o.id).await?;
    }
    let mut am: order::ActiveModel = o.into();
    am.status = Set(status);
    am.stock_reserved = Set(holds_stock);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn confirm_order(db: &DatabaseConnection, customer_id: Uuid, id: Uuid) -> Result<OrderView, ServiceError> {
    let txn = db.begin().await?;
    let o = find_own_order(&txn, customer_id, id).await?;
    workflow::ensure_order_confirmable(o.status, o.stock_reserved)?;
    reserve_stock(&txn, o.id).await?;
    let mut am: order::ActiveModel = o.into();
    am.status = Set(OrderStatus::Processing);
    am.stock_reserved = Set(true);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(order_id = %id, %customer_id, "order_confirmed");
    order_view(db, updated).await
}

pub async fn cancel_order(db: &DatabaseConnection, customer_id: Uuid, id: Uuid) -> Result<OrderView, ServiceError> {
    let txn = db.begin().await?;
    let o = find_own_order(&txn, customer_id, id).await?;
    workflow::ensure_order_cancellable(o.status)?;
    let restored = o.stock_reserved;
    let updated = cancel_in_txn(&txn, o).await?;
    txn.commit().await?;
    info!(order_id = %id, %customer_id, stock_restored = restored, "order_cancelled");
    order_view(db, updated).await
}

/// Own orders, newest first.
pub async fn list_orders(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<OrderView>, ServiceError> {
    let orders = order::Entity::find()
        .filter(order::Column::CustomerId.eq(customer_id))
        .order_by_desc(order::Column::OrderDate)
        .all(db)
        .await?;
    build_order_views(db, orders).await
}

pub async fn get_order(db: &DatabaseConnection, customer_id: Uuid, id: Uuid) -> Result<OrderView, ServiceError> {
    let o = find_own_order(db, customer_id, id).await?;
    order_view(db, o).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_address, make_product, make_user, skip_db};
    use models::UserRole;
    use rust_decimal_macros::dec;

    async fn stock_of(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<i32> {
        Ok(product::Entity::find_by_id(id).one(db).await?.map(|p| p.stock).unwrap_or(-1))
    }

    #[tokio::test]
    async fn confirm_takes_stock_and_cancel_returns_it() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let p = make_product(&db, dec!(1500.00), 5).await?;

        let placed = place_order(&db, customer.id, &p.slug, 2, addr.id).await?;
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.total_amount, dec!(3000.00));
        assert_eq!(stock_of(&db, p.id).await?, 5);

        let confirmed = confirm_order(&db, customer.id, placed.id).await?;
        assert_eq!(confirmed.status, OrderStatus::Processing);
        assert_eq!(stock_of(&db, p.id).await?, 3);
        assert!(confirm_order(&db, customer.id, placed.id).await.is_err());

        let cancelled = cancel_order(&db, customer.id, placed.id).await?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&db, p.id).await?, 5);
        assert_eq!(
            cancel_order(&db, customer.id, placed.id).await.unwrap_err().to_string(),
            "Order cannot be cancelled"
        );
        Ok(())
    }

    #[tokio::test]
    async fn cancelling_pending_order_leaves_stock() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let p = make_product(&db, dec!(10.00), 4).await?;
        let placed = place_order(&db, customer.id, &p.slug, 1, addr.id).await?;
        cancel_order(&db, customer.id, placed.id).await?;
        assert_eq!(stock_of(&db, p.id).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn bulk_order_rejects_before_writing() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let plenty = make_product(&db, dec!(100.00), 10).await?;
        let scarce = make_product(&db, dec!(200.00), 1).await?;

        let err = place_bulk_order(
            &db,
            customer.id,
            addr.id,
            vec![
                OrderLine { product_slug: plenty.slug.clone(), quantity: 2 },
                OrderLine { product_slug: scarce.slug.clone(), quantity: 3 },
            ],
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), format!("Only 1 items available in stock for {}", scarce.name));
        assert!(list_orders(&db, customer.id).await?.is_empty());

        let ok = place_bulk_order(
            &db,
            customer.id,
            addr.id,
            vec![
                OrderLine { product_slug: plenty.slug.clone(), quantity: 2 },
                OrderLine { product_slug: scarce.slug.clone(), quantity: 1 },
            ],
        )
        .await?;
        assert_eq!(ok.items.len(), 2);
        assert_eq!(ok.total_amount, dec!(400.00));
        assert!(!ok.can_rate);
        Ok(())
    }

    #[tokio::test]
    async fn single_order_stock_message_and_foreign_address() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let stranger = make_user(&db, UserRole::Customer).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let foreign = make_address(&db, stranger.id, true).await?;
        let p = make_product(&db, dec!(10.00), 2).await?;

        let err = place_order(&db, customer.id, &p.slug, 3, addr.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Only 2 items available in stock");
        let err = place_order(&db, customer.id, &p.slug, 1, foreign.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn confirmation_fails_atomically_when_stock_ran_out() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let a = make_product(&db, dec!(10.00), 5).await?;
        let b = make_product(&db, dec!(10.00), 1).await?;
        let placed = place_bulk_order(
            &db,
            customer.id,
            addr.id,
            vec![
                OrderLine { product_slug: a.slug.clone(), quantity: 2 },
                OrderLine { product_slug: b.slug.clone(), quantity: 1 },
            ],
        )
        .await?;
        // someone else buys the last unit of b
        product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::value(0))
            .filter(product::Column::Id.eq(b.id))
            .exec(&db)
            .await?;

        assert!(confirm_order(&db, customer.id, placed.id).await.is_err());
        assert_eq!(stock_of(&db, a.id).await?, 5);
        assert_eq!(get_order(&db, customer.id, placed.id).await?.status, OrderStatus::Pending);
        Ok(())
    }
}
