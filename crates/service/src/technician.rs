//! Technician dashboard: assigned work, stats and completion.

use chrono::{Datelike, TimeZone, Utc};
use models::{order, service_request, technician_rating, user, OrderStatus, ServiceStatus, UserRole};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::job_sheets::approval_for_request;
use crate::orders::{build_order_views, set_status_in_txn, OrderView};
use crate::service_requests::{with_job_sheets, RequestWithJobSheet};
use crate::workflow;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TechnicianStats {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub total_services: u64,
    pub completed_services: u64,
    pub average_rating: f64,
    pub this_month_completed: u64,
}

fn ensure_technician(u: &user::Model) -> Result<(), ServiceError> {
    if u.role != UserRole::Technician {
        return Err(ServiceError::forbidden("Access denied"));
    }
    Ok(())
}

/// Mean of 1..=5 ratings rounded to one decimal; zero when unrated.
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: Decimal = ratings.iter().map(|r| Decimal::from(*r)).sum();
    (sum / Decimal::from(ratings.len() as u64)).round_dp(1).to_f64().unwrap_or(0.0)
}

pub async fn assigned_orders(db: &DatabaseConnection, technician: &user::Model) -> Result<Vec<OrderView>, ServiceError> {
    ensure_technician(technician)?;
    let orders = order::Entity::find()
        .filter(order::Column::TechnicianId.eq(technician.id))
        .order_by_desc(order::Column::OrderDate)
        .all(db)
        .await?;
    build_order_views(db, orders).await
}

pub async fn assigned_services(
    db: &DatabaseConnection,
    technician: &user::Model,
) -> Result<Vec<RequestWithJobSheet>, ServiceError> {
    ensure_technician(technician)?;
    let rows = service_request::Entity::find()
        .filter(service_request::Column::TechnicianId.eq(technician.id))
        .order_by_desc(service_request::Column::RequestDate)
        .all(db)
        .await?;
    with_job_sheets(db, rows).await
}

pub async fn stats(db: &DatabaseConnection, technician: &user::Model) -> Result<TechnicianStats, ServiceError> {
    ensure_technician(technician)?;
    let now = Utc::now();
    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    let mine_orders = || order::Entity::find().filter(order::Column::TechnicianId.eq(technician.id));
    let mine_services = || service_request::Entity::find().filter(service_request::Column::TechnicianId.eq(technician.id));

    let total_orders = mine_orders().count(db).await?;
    let completed_orders = mine_orders().filter(order::Column::Status.eq(OrderStatus::Delivered)).count(db).await?;
    let total_services = mine_services().count(db).await?;
    let completed_services = mine_services()
        .filter(service_request::Column::Status.eq(ServiceStatus::Completed))
        .count(db)
        .await?;
    let month_orders = mine_orders()
        .filter(order::Column::Status.eq(OrderStatus::Delivered))
        .filter(order::Column::UpdatedAt.gte(month_start))
        .count(db)
        .await?;
    let month_services = mine_services()
        .filter(service_request::Column::Status.eq(ServiceStatus::Completed))
        .filter(service_request::Column::UpdatedAt.gte(month_start))
        .count(db)
        .await?;
    let ratings: Vec<i16> = technician_rating::Entity::find()
        .filter(technician_rating::Column::TechnicianId.eq(technician.id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    Ok(TechnicianStats {
        total_orders,
        completed_orders,
        total_services,
        completed_services,
        average_rating: average_rating(&ratings),
        this_month_completed: month_orders + month_services,
    })
}

pub async fn complete_order(db: &DatabaseConnection, technician: &user::Model, id: Uuid) -> Result<(), ServiceError> {
    ensure_technician(technician)?;
    let txn = db.begin().await?;
    let found = order::Entity::find_by_id(id)
        .filter(order::Column::TechnicianId.eq(technician.id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Order not found or not assigned to you".into()))?;
    set_status_in_txn(&txn, found, OrderStatus::Delivered).await?;
    txn.commit().await?;
    info!(order_id = %id, technician_id = %technician.id, "order_delivered");
    Ok(())
}

/// Completion is gated on an approved job sheet.
pub async fn complete_service(db: &DatabaseConnection, technician: &user::Model, id: Uuid) -> Result<(), ServiceError> {
    if technician.role != UserRole::Technician {
        return Err(ServiceError::forbidden("Only technicians can complete service requests"));
    }
    let txn = db.begin().await?;
    let found = service_request::Entity::find_by_id(id)
        .filter(service_request::Column::TechnicianId.eq(technician.id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Service request not found or not assigned to you".into()))?;
    let approval = approval_for_request(&txn, id).await?;
    workflow::ensure_service_completable(found.status, approval)?;
    let mut am: service_request::ActiveModel = found.into();
    am.status = Set(ServiceStatus::Completed);
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;
    txn.commit().await?;
    info!(request_id = %id, technician_id = %technician.id, "service_completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_sheets::tests::{assigned_request, sheet_input};
    use crate::job_sheets::{approve, create as create_sheet, decline};
    use crate::test_support::{get_db, make_user, skip_db};
    use models::ApprovalStatus;

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1, 2]), 1.5);
    }

    #[tokio::test]
    async fn completion_walks_the_job_sheet_gate() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;

        let err = complete_service(&db, &technician, request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot complete service. Please create a job sheet first.");

        let sheet = create_sheet(&db, &technician, sheet_input(request.id)).await?;
        let err = complete_service(&db, &technician, request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot complete service. Job sheet is pending customer approval.");

        approve(&db, customer.id, sheet.id).await?;
        complete_service(&db, &technician, request.id).await?;
        let after = service_request::Entity::find_by_id(request.id).one(&db).await?.map(|r| r.status);
        assert_eq!(after, Some(ServiceStatus::Completed));

        let again = complete_service(&db, &technician, request.id).await.unwrap_err();
        assert_eq!(again.to_string(), "Service already marked as completed");

        let s = stats(&db, &technician).await?;
        assert_eq!(s.total_services, 1);
        assert_eq!(s.completed_services, 1);
        assert_eq!(s.this_month_completed, 1);

        let services = assigned_services(&db, &technician).await?;
        assert_eq!(services[0].job_sheet_status, Some(ApprovalStatus::Approved));
        assert!(services[0].has_job_sheet);
        Ok(())
    }

    #[tokio::test]
    async fn declined_sheet_blocks_completion() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;
        let sheet = create_sheet(&db, &technician, sheet_input(request.id)).await?;
        decline(&db, customer.id, sheet.id, Some("Wrong unit".into())).await?;
        let err = complete_service(&db, &technician, request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot complete service. Job sheet was declined by customer.");
        Ok(())
    }

    #[tokio::test]
    async fn non_technicians_are_refused() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        assert!(matches!(stats(&db, &customer).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(assigned_orders(&db, &customer).await, Err(ServiceError::Forbidden(_))));
        let (_, _, own_request) = assigned_request(&db).await?;
        let err = complete_service(&db, &customer, own_request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Only technicians can complete service requests");
        let other_tech = make_user(&db, UserRole::Technician).await?;
        let (_, _, request) = assigned_request(&db).await?;
        assert!(matches!(complete_service(&db, &other_tech, request.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
