use chrono::Utc;
use models::{order, order_item, service_category, service_request, technician_rating, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::workflow::{self, RatingTarget};

#[derive(Debug, Clone, Deserialize)]
pub struct RatingInput {
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
    pub order_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    pub id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub technician_name: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_category: Option<String>,
}

/// Validation runs in a fixed order so the first failing rule decides the message.
pub async fn create_rating(
    db: &DatabaseConnection,
    customer_id: Uuid,
    input: RatingInput,
) -> Result<RatingView, ServiceError> {
    let value = workflow::ensure_rating_value(input.rating)?;
    let target = workflow::resolve_rating_target(input.order_id, input.service_request_id)?;

    let (technician_id, duplicate_msg) = match target {
        RatingTarget::Order(id) => {
            let o = order::Entity::find_by_id(id)
                .filter(order::Column::CustomerId.eq(customer_id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound("Order not found or you do not have permission to rate it".into())
                })?;
            let rated = technician_rating::Entity::find()
                .filter(technician_rating::Column::OrderId.eq(id))
                .count(db)
                .await?
                > 0;
            (workflow::ensure_order_rateable(o.status, o.technician_id, rated)?, "You have already rated this order")
        }
        RatingTarget::ServiceRequest(id) => {
            let r = service_request::Entity::find_by_id(id)
                .filter(service_request::Column::CustomerId.eq(customer_id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(
                        "Service request not found or you do not have permission to rate it".into(),
                    )
                })?;
            let rated = technician_rating::Entity::find()
                .filter(technician_rating::Column::ServiceRequestId.eq(id))
                .count(db)
                .await?
                > 0;
            (
                workflow::ensure_service_rateable(r.status, r.technician_id, rated)?,
                "You have already rated this service request",
            )
        }
    };

    let (order_id, service_request_id) = match target {
        RatingTarget::Order(id) => (Some(id), None),
        RatingTarget::ServiceRequest(id) => (None, Some(id)),
    };
    let created = technician_rating::ActiveModel {
        id: Set(Uuid::new_v4()),
        technician_id: Set(technician_id),
        customer_id: Set(customer_id),
        order_id: Set(order_id),
        service_request_id: Set(service_request_id),
        rating: Set(value),
        comment: Set(input.comment.trim().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        // a concurrent submission won the unique index
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::validation(duplicate_msg),
        _ => ServiceError::from(e),
    })?;
    info!(rating_id = %created.id, %technician_id, %customer_id, rating = value, "technician_rated");

    let mut views = build_views(db, vec![created]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("Rating"))
}

/// Ratings the customer has submitted, newest first.
pub async fn my_ratings(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<RatingView>, ServiceError> {
    let rows = technician_rating::Entity::find()
        .filter(technician_rating::Column::CustomerId.eq(customer_id))
        .order_by_desc(technician_rating::Column::CreatedAt)
        .all(db)
        .await?;
    build_views(db, rows).await
}

async fn build_views(
    db: &DatabaseConnection,
    rows: Vec<technician_rating::Model>,
) -> Result<Vec<RatingView>, ServiceError> {
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let technician_name = user::Entity::find_by_id(r.technician_id)
            .one(db)
            .await?
            .map(|t| t.name)
            .unwrap_or_default();
        let order_total = match r.order_id {
            Some(id) => {
                let items = order_item::Entity::find()
                    .filter(order_item::Column::OrderId.eq(id))
                    .all(db)
                    .await?;
                Some(order_item::total_amount(&items))
            }
            None => None,
        };
        let service_category = match r.service_request_id {
            Some(id) => match service_request::Entity::find_by_id(id).one(db).await? {
                Some(req) => service_category::Entity::find_by_id(req.service_category_id)
                    .one(db)
                    .await?
                    .map(|c| c.name),
                None => None,
            },
            None => None,
        };
        out.push(RatingView {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            technician_name,
            created_at: r.created_at,
            kind: if r.order_id.is_some() { "order" } else { "service" },
            order_id: r.order_id,
            order_total,
            service_request_id: r.service_request_id,
            service_category,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_sheets::tests::assigned_request;
    use crate::test_support::{get_db, make_address, make_product, make_user, skip_db};
    use models::{OrderStatus, ServiceStatus, UserRole};
    use rust_decimal_macros::dec;

    fn input(order_id: Option<Uuid>, service_request_id: Option<Uuid>, rating: i64) -> RatingInput {
        RatingInput { rating: Some(rating), comment: "Prompt and tidy".into(), order_id, service_request_id }
    }

    #[tokio::test]
    async fn order_rating_lifecycle() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let technician = make_user(&db, UserRole::Technician).await?;
        let addr = make_address(&db, customer.id, true).await?;
        let p = make_product(&db, dec!(250.00), 5).await?;
        let placed = crate::orders::place_order(&db, customer.id, &p.slug, 2, addr.id).await?;

        let err = create_rating(&db, customer.id, input(Some(placed.id), None, 5)).await.unwrap_err();
        assert_eq!(err.to_string(), "No technician assigned to this order");

        let o = order::Entity::find_by_id(placed.id).one(&db).await?.expect("order");
        let mut am: order::ActiveModel = o.into();
        am.technician_id = Set(Some(technician.id));
        am.status = Set(OrderStatus::Delivered);
        am.update(&db).await?;

        let bad = create_rating(&db, customer.id, input(Some(placed.id), None, 6)).await.unwrap_err();
        assert_eq!(bad.to_string(), "Valid rating (1-5) is required");

        let view = create_rating(&db, customer.id, input(Some(placed.id), None, 4)).await?;
        assert_eq!(view.rating, 4);
        assert_eq!(view.kind, "order");
        assert_eq!(view.technician_name, technician.name);
        assert_eq!(view.order_total, Some(dec!(500.00)));

        let again = create_rating(&db, customer.id, input(Some(placed.id), None, 3)).await.unwrap_err();
        assert_eq!(again.to_string(), "You have already rated this order");
        assert_eq!(my_ratings(&db, customer.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn service_rating_requires_completion() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, _, request) = assigned_request(&db).await?;

        let err = create_rating(&db, customer.id, input(None, Some(request.id), 5)).await.unwrap_err();
        assert_eq!(err.to_string(), "Can only rate completed service requests");

        let mut am: service_request::ActiveModel = request.clone().into();
        am.status = Set(ServiceStatus::Completed);
        am.update(&db).await?;
        let view = create_rating(&db, customer.id, input(None, Some(request.id), 5)).await?;
        assert_eq!(view.kind, "service");
        assert!(view.service_category.is_some());

        let stranger = make_user(&db, UserRole::Customer).await?;
        let denied = create_rating(&db, stranger.id, input(None, Some(request.id), 5)).await;
        assert!(matches!(denied, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
