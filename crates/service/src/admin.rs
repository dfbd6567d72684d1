//! Staff console operations: dashboard, assignment, status overrides and the service catalogue.
//!
//! Callers are expected to have passed the staff guard already; nothing here re-checks `is_staff`.

use std::collections::HashSet;

use chrono::Utc;
use models::{
    order, order_item, product, service_category, service_issue, service_request, technician_rating, user,
    OrderStatus, ServiceStatus, UserRole,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::job_sheets::approval_for_request;
use crate::orders::{build_order_views, order_view, set_status_in_txn, OrderView};
use crate::service_requests::{with_job_sheets, IssueView, RequestWithJobSheet, ServiceRequestView, request_view};
use crate::technician::average_rating;
use crate::workflow;

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_customers: u64,
    pub total_technicians: u64,
    pub total_products: u64,
    pub active_products: u64,
    pub low_stock_products: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub unassigned_orders: u64,
    pub total_services: u64,
    pub pending_services: u64,
    pub unassigned_services: u64,
    pub total_revenue: Decimal,
    pub avg_technician_rating: f64,
}

pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    let users = || user::Entity::find();
    let orders = || order::Entity::find();
    let services = || service_request::Entity::find();

    let revenue_orders: Vec<Uuid> = orders()
        .all(db)
        .await?
        .into_iter()
        .filter(|o| o.status.counts_as_revenue())
        .map(|o| o.id)
        .collect();
    let revenue_items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(revenue_orders))
        .all(db)
        .await?;
    let ratings: Vec<i16> = technician_rating::Entity::find().all(db).await?.into_iter().map(|r| r.rating).collect();

    Ok(DashboardStats {
        total_users: users().count(db).await?,
        total_customers: users().filter(user::Column::Role.eq(UserRole::Customer)).count(db).await?,
        total_technicians: users().filter(user::Column::Role.eq(UserRole::Technician)).count(db).await?,
        total_products: product::Entity::find().count(db).await?,
        active_products: product::Entity::find().filter(product::Column::IsActive.eq(true)).count(db).await?,
        low_stock_products: product::Entity::find()
            .filter(product::Column::Stock.lt(LOW_STOCK_THRESHOLD))
            .count(db)
            .await?,
        total_orders: orders().count(db).await?,
        pending_orders: orders().filter(order::Column::Status.eq(OrderStatus::Pending)).count(db).await?,
        unassigned_orders: orders().filter(order::Column::TechnicianId.is_null()).count(db).await?,
        total_services: services().count(db).await?,
        pending_services: services()
            .filter(service_request::Column::Status.eq(ServiceStatus::Submitted))
            .count(db)
            .await?,
        unassigned_services: services().filter(service_request::Column::TechnicianId.is_null()).count(db).await?,
        total_revenue: order_item::total_amount(&revenue_items),
        avg_technician_rating: average_rating(&ratings),
    })
}

/// `technician` is either a technician id or the literal `unassigned`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub technician: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    pub status: Option<ServiceStatus>,
    pub technician: Option<String>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderView>,
    pub pending_count: u64,
    pub unassigned_count: u64,
    pub processing_count: u64,
    pub completed_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceList {
    pub services: Vec<RequestWithJobSheet>,
    pub submitted_count: u64,
    pub unassigned_count: u64,
    pub in_progress_count: u64,
    pub completed_count: u64,
}

enum TechnicianFilter {
    Unassigned,
    Id(Uuid),
}

fn parse_technician_filter(raw: Option<&str>) -> Result<Option<TechnicianFilter>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some("unassigned") => Ok(Some(TechnicianFilter::Unassigned)),
        Some(id) => Uuid::parse_str(id)
            .map(|id| Some(TechnicianFilter::Id(id)))
            .map_err(|_| ServiceError::validation("Invalid technician filter")),
    }
}

/// Case-insensitive match against the id and any of the given fields.
fn matches_search(needle: &str, id: Uuid, fields: &[Option<&str>]) -> bool {
    let needle = needle.to_lowercase();
    id.to_string().contains(&needle)
        || fields.iter().flatten().any(|f| f.to_lowercase().contains(&needle))
}

pub async fn list_orders(db: &DatabaseConnection, filter: OrderFilter) -> Result<OrderList, ServiceError> {
    let mut query = order::Entity::find().order_by_desc(order::Column::OrderDate);
    if let Some(status) = filter.status {
        query = query.filter(order::Column::Status.eq(status));
    }
    match parse_technician_filter(filter.technician.as_deref())? {
        Some(TechnicianFilter::Unassigned) => query = query.filter(order::Column::TechnicianId.is_null()),
        Some(TechnicianFilter::Id(id)) => query = query.filter(order::Column::TechnicianId.eq(id)),
        None => {}
    }
    let mut orders = build_order_views(db, query.all(db).await?).await?;
    if let Some(needle) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        orders.retain(|o| matches_search(needle, o.id, &[o.customer_name.as_deref(), o.customer_email.as_deref()]));
    }

    let count = |status: OrderStatus| order::Entity::find().filter(order::Column::Status.eq(status)).count(db);
    Ok(OrderList {
        orders,
        pending_count: count(OrderStatus::Pending).await?,
        unassigned_count: order::Entity::find().filter(order::Column::TechnicianId.is_null()).count(db).await?,
        processing_count: count(OrderStatus::Processing).await?,
        completed_count: count(OrderStatus::Delivered).await?,
    })
}

pub async fn order_detail(db: &DatabaseConnection, id: Uuid) -> Result<OrderView, ServiceError> {
    let o = find_order(db, id).await?;
    order_view(db, o).await
}

async fn find_order<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<order::Model, ServiceError> {
    order::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Order"))
}

async fn find_service<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service_request::Model, ServiceError> {
    service_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service request"))
}

async fn find_technician<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(UserRole::Technician))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("Selected user is not a technician"))
}

/// Assigns a technician; a PENDING order moves to PROCESSING and takes its stock.
pub async fn assign_order_technician(
    db: &DatabaseConnection,
    order_id: Uuid,
    technician_id: Uuid,
) -> Result<OrderView, ServiceError> {
    let txn = db.begin().await?;
    let o = find_order(&txn, order_id).await?;
    let technician = find_technician(&txn, technician_id).await?;
    let next = workflow::status_after_order_assignment(o.status);
    let o = if next != o.status { set_status_in_txn(&txn, o, next).await? } else { o };
    let mut am: order::ActiveModel = o.into();
    am.technician_id = Set(Some(technician.id));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(%order_id, %technician_id, status = updated.status.as_str(), "order_technician_assigned");
    order_view(db, updated).await
}

pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<OrderView, ServiceError> {
    let txn = db.begin().await?;
    let o = find_order(&txn, order_id).await?;
    if o.status == status {
        txn.commit().await?;
        return order_view(db, o).await;
    }
    let from = o.status;
    let updated = set_status_in_txn(&txn, o, status).await?;
    txn.commit().await?;
    info!(%order_id, from = from.as_str(), to = status.as_str(), "order_status_updated");
    order_view(db, updated).await
}

/// Deletes an order and its items. Stock held for an undelivered order is returned first.
pub async fn delete_order(db: &DatabaseConnection, order_id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let o = find_order(&txn, order_id).await?;
    if o.stock_reserved && o.status != OrderStatus::Delivered {
        crate::orders::release_stock(&txn, o.id).await?;
    }
    o.delete(&txn).await?;
    txn.commit().await?;
    info!(%order_id, "order_deleted");
    Ok(())
}

pub async fn list_services(db: &DatabaseConnection, filter: ServiceFilter) -> Result<ServiceList, ServiceError> {
    let mut query = service_request::Entity::find().order_by_desc(service_request::Column::RequestDate);
    if let Some(status) = filter.status {
        query = query.filter(service_request::Column::Status.eq(status));
    }
    if let Some(category) = filter.category {
        query = query.filter(service_request::Column::ServiceCategoryId.eq(category));
    }
    match parse_technician_filter(filter.technician.as_deref())? {
        Some(TechnicianFilter::Unassigned) => query = query.filter(service_request::Column::TechnicianId.is_null()),
        Some(TechnicianFilter::Id(id)) => query = query.filter(service_request::Column::TechnicianId.eq(id)),
        None => {}
    }
    let mut services = with_job_sheets(db, query.all(db).await?).await?;
    if let Some(needle) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        services.retain(|s| {
            let r = &s.request;
            matches_search(
                needle,
                r.id,
                &[r.customer_name.as_deref(), r.customer_email.as_deref(), Some(r.custom_description.as_str())],
            )
        });
    }

    let count = |status: ServiceStatus| {
        service_request::Entity::find().filter(service_request::Column::Status.eq(status)).count(db)
    };
    Ok(ServiceList {
        services,
        submitted_count: count(ServiceStatus::Submitted).await?,
        unassigned_count: service_request::Entity::find()
            .filter(service_request::Column::TechnicianId.is_null())
            .count(db)
            .await?,
        in_progress_count: count(ServiceStatus::InProgress).await?,
        completed_count: count(ServiceStatus::Completed).await?,
    })
}

pub async fn service_detail(db: &DatabaseConnection, id: Uuid) -> Result<RequestWithJobSheet, ServiceError> {
    let r = find_service(db, id).await?;
    with_job_sheets(db, vec![r]).await?.pop().ok_or_else(|| ServiceError::not_found("Service request"))
}

/// Assigns a technician; a SUBMITTED request becomes ASSIGNED.
pub async fn assign_service_technician(
    db: &DatabaseConnection,
    service_id: Uuid,
    technician_id: Uuid,
) -> Result<ServiceRequestView, ServiceError> {
    let r = find_service(db, service_id).await?;
    let technician = find_technician(db, technician_id).await?;
    let status = workflow::status_after_service_assignment(r.status);
    let mut am: service_request::ActiveModel = r.into();
    am.technician_id = Set(Some(technician.id));
    am.status = Set(status);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(%service_id, %technician_id, status = status.as_str(), "service_technician_assigned");
    request_view(db, updated).await
}

/// Staff may set any status, but COMPLETED still requires an approved job sheet.
pub async fn update_service_status(
    db: &DatabaseConnection,
    service_id: Uuid,
    status: ServiceStatus,
) -> Result<ServiceRequestView, ServiceError> {
    let txn = db.begin().await?;
    let r = find_service(&txn, service_id).await?;
    if status == ServiceStatus::Completed {
        let approval = approval_for_request(&txn, service_id).await?;
        workflow::ensure_service_completable(r.status, approval)?;
    }
    let from = r.status;
    let mut am: service_request::ActiveModel = r.into();
    am.status = Set(status);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(%service_id, from = from.as_str(), to = status.as_str(), "service_status_updated");
    request_view(db, updated).await
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueInput {
    /// Present when editing an existing issue.
    pub id: Option<Uuid>,
    pub description: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCategoryInput {
    pub name: String,
    #[serde(default)]
    pub issues: Vec<IssueInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminServiceCategory {
    pub id: Uuid,
    pub name: String,
    pub issues: Vec<IssueView>,
    pub request_count: u64,
}

fn validate_category(input: &ServiceCategoryInput) -> Result<String, ServiceError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    for issue in &input.issues {
        if issue.description.trim().is_empty() {
            return Err(ServiceError::validation("Issue description is required"));
        }
        if issue.price < Decimal::ZERO {
            return Err(ServiceError::validation("Issue price cannot be negative"));
        }
    }
    Ok(name.to_string())
}

async fn ensure_category_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = service_category::Entity::find().filter(service_category::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(service_category::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!("Service category \"{name}\" already exists")));
    }
    Ok(())
}

async fn category_view<C: ConnectionTrait>(
    db: &C,
    c: service_category::Model,
) -> Result<AdminServiceCategory, ServiceError> {
    let issues = service_issue::Entity::find()
        .filter(service_issue::Column::CategoryId.eq(c.id))
        .order_by_asc(service_issue::Column::Description)
        .all(db)
        .await?;
    let request_count = service_request::Entity::find()
        .filter(service_request::Column::ServiceCategoryId.eq(c.id))
        .count(db)
        .await?;
    Ok(AdminServiceCategory {
        id: c.id,
        name: c.name,
        issues: issues.into_iter().map(IssueView::from).collect(),
        request_count,
    })
}

pub async fn list_service_categories(db: &DatabaseConnection) -> Result<Vec<AdminServiceCategory>, ServiceError> {
    let mut out = Vec::new();
    for c in service_category::Entity::find()
        .order_by_asc(service_category::Column::Name)
        .all(db)
        .await?
    {
        out.push(category_view(db, c).await?);
    }
    Ok(out)
}

pub async fn create_service_category(
    db: &DatabaseConnection,
    input: ServiceCategoryInput,
) -> Result<AdminServiceCategory, ServiceError> {
    let name = validate_category(&input)?;
    let txn = db.begin().await?;
    ensure_category_name_free(&txn, &name, None).await?;
    let created = service_category::ActiveModel { id: Set(Uuid::new_v4()), name: Set(name) }
        .insert(&txn)
        .await?;
    for issue in input.issues {
        insert_issue(&txn, created.id, issue).await?;
    }
    txn.commit().await?;
    info!(category_id = %created.id, name = %created.name, "service_category_created");
    category_view(db, created).await
}

async fn insert_issue<C: ConnectionTrait>(db: &C, category_id: Uuid, issue: IssueInput) -> Result<(), ServiceError> {
    service_issue::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        description: Set(issue.description.trim().to_string()),
        price: Set(issue.price),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Renames the category and reconciles its issues: listed ids are updated,
/// entries without an id are added and unlisted issues are removed.
pub async fn update_service_category(
    db: &DatabaseConnection,
    id: Uuid,
    input: ServiceCategoryInput,
) -> Result<AdminServiceCategory, ServiceError> {
    let name = validate_category(&input)?;
    let txn = db.begin().await?;
    let existing = service_category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service category"))?;
    ensure_category_name_free(&txn, &name, Some(id)).await?;
    let mut am: service_category::ActiveModel = existing.into();
    am.name = Set(name);
    let updated = am.update(&txn).await?;

    let current = service_issue::Entity::find()
        .filter(service_issue::Column::CategoryId.eq(id))
        .all(&txn)
        .await?;
    let kept: HashSet<Uuid> = input.issues.iter().filter_map(|i| i.id).collect();
    for stale in current.iter().filter(|i| !kept.contains(&i.id)) {
        service_issue::Entity::delete_by_id(stale.id).exec(&txn).await?;
    }
    for issue in input.issues {
        match issue.id.and_then(|iid| current.iter().find(|c| c.id == iid)) {
            Some(row) => {
                let mut am: service_issue::ActiveModel = row.clone().into();
                am.description = Set(issue.description.trim().to_string());
                am.price = Set(issue.price);
                am.update(&txn).await?;
            }
            None => insert_issue(&txn, id, issue).await?,
        }
    }
    txn.commit().await?;
    info!(category_id = %id, "service_category_updated");
    category_view(db, updated).await
}

pub async fn delete_service_category(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let c = service_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service category"))?;
    let in_use = service_request::Entity::find()
        .filter(service_request::Column::ServiceCategoryId.eq(id))
        .count(db)
        .await?;
    if in_use > 0 {
        return Err(ServiceError::validation(format!(
            "Cannot delete category \"{}\" because it has {} associated service requests. Please reassign or delete those services first.",
            c.name, in_use
        )));
    }
    c.delete(db).await?;
    info!(category_id = %id, "service_category_deleted");
    Ok(())
}
