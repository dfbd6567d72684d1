//! Job sheets: technician field reports that the customer must approve before a
//! service request can be completed.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use models::{
    address, job_sheet, job_sheet_material, service_category, service_request, user, ApprovalStatus, UserRole,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::workflow;

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialInput {
    pub date_used: Option<NaiveDate>,
    pub item_description: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSheetInput {
    pub service_request_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub service_address: Option<String>,
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub equipment_brand: String,
    #[serde(default)]
    pub equipment_model: String,
    pub problem_description: Option<String>,
    pub work_performed: Option<String>,
    pub date_of_service: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub finish_time: Option<NaiveTime>,
    #[serde(default)]
    pub materials: Vec<MaterialInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialView {
    pub id: Uuid,
    pub date_used: NaiveDate,
    pub item_description: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

impl From<job_sheet_material::Model> for MaterialView {
    fn from(m: job_sheet_material::Model) -> Self {
        Self {
            id: m.id,
            date_used: m.date_used,
            item_description: m.item_description,
            quantity: m.quantity,
            unit_cost: m.unit_cost,
            total_cost: m.total_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSheetView {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub service_category_name: String,
    pub customer_name: String,
    pub customer_contact: String,
    pub service_address: String,
    pub equipment_type: String,
    pub serial_number: String,
    pub equipment_brand: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub work_performed: String,
    pub date_of_service: NaiveDate,
    pub start_time: NaiveTime,
    pub finish_time: NaiveTime,
    pub total_time_minutes: i32,
    pub total_time_taken: String,
    pub approval_status: ApprovalStatus,
    pub declined_reason: Option<String>,
    pub materials: Vec<MaterialView>,
    pub total_material_cost: Decimal,
    pub technician_id: Option<Uuid>,
    pub technician_name: Option<String>,
    pub technician_phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub approved_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSheetFilter {
    pub approval: Option<ApprovalStatus>,
    pub technician: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSheetCounts {
    pub pending_count: u64,
    pub approved_count: u64,
    pub declined_count: u64,
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminJobSheetList {
    pub job_sheets: Vec<JobSheetView>,
    #[serde(flatten)]
    pub counts: JobSheetCounts,
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::validation(format!("{field} is required"))),
    }
}

fn present<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::validation(format!("{field} is required")))
}

fn validate_material(m: &MaterialInput) -> Result<(), ServiceError> {
    if m.item_description.trim().is_empty() {
        return Err(ServiceError::validation("item_description is required"));
    }
    if m.quantity <= Decimal::ZERO {
        return Err(ServiceError::validation("Material quantity must be greater than zero"));
    }
    if m.unit_cost.is_sign_negative() {
        return Err(ServiceError::validation("Material unit cost cannot be negative"));
    }
    Ok(())
}

/// Technician files a sheet for a request assigned to them; materials are written in the same transaction.
pub async fn create(
    db: &DatabaseConnection,
    technician: &user::Model,
    input: JobSheetInput,
) -> Result<JobSheetView, ServiceError> {
    if technician.role != UserRole::Technician {
        return Err(ServiceError::forbidden("Only technicians can create job sheets"));
    }
    let txn = db.begin().await?;
    let request = service_request::Entity::find_by_id(input.service_request_id)
        .filter(service_request::Column::TechnicianId.eq(technician.id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Service request not found or not assigned to you".into()))?;
    let existing = job_sheet::Entity::find()
        .filter(job_sheet::Column::ServiceRequestId.eq(request.id))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(ServiceError::validation("Job sheet already exists for this service request"));
    }

    let equipment_type = required(input.equipment_type, "equipment_type")?;
    let problem_description = required(input.problem_description, "problem_description")?;
    let work_performed = required(input.work_performed, "work_performed")?;
    let date_of_service = present(input.date_of_service, "date_of_service")?;
    let start_time = present(input.start_time, "start_time")?;
    let finish_time = present(input.finish_time, "finish_time")?;
    let total_time_minutes = workflow::total_time_minutes(start_time, finish_time)?;
    for m in &input.materials {
        validate_material(m)?;
    }

    let customer = user::Entity::find_by_id(request.customer_id).one(&txn).await?;
    let location = match request.service_location_id {
        Some(id) => address::Entity::find_by_id(id).one(&txn).await?,
        None => None,
    };
    let customer_name = input
        .customer_name
        .filter(|s| !s.trim().is_empty())
        .or_else(|| customer.as_ref().map(|c| c.name.clone()))
        .unwrap_or_default();
    let customer_contact = input
        .customer_contact
        .filter(|s| !s.trim().is_empty())
        .or_else(|| customer.as_ref().and_then(|c| c.phone.clone()))
        .unwrap_or_default();
    let service_address = input
        .service_address
        .filter(|s| !s.trim().is_empty())
        .or_else(|| location.as_ref().map(address::Model::one_line))
        .unwrap_or_default();

    let now = Utc::now();
    let sheet = job_sheet::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_request_id: Set(request.id),
        customer_name: Set(customer_name),
        customer_contact: Set(customer_contact),
        service_address: Set(service_address),
        equipment_type: Set(equipment_type),
        serial_number: Set(input.serial_number),
        equipment_brand: Set(input.equipment_brand),
        equipment_model: Set(input.equipment_model),
        problem_description: Set(problem_description),
        work_performed: Set(work_performed),
        date_of_service: Set(date_of_service),
        start_time: Set(start_time),
        finish_time: Set(finish_time),
        total_time_minutes: Set(total_time_minutes),
        approval_status: Set(ApprovalStatus::Pending),
        customer_signature: Set(None),
        approved_at: Set(None),
        declined_reason: Set(None),
        created_by: Set(Some(technician.id)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    for m in input.materials {
        job_sheet_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_sheet_id: Set(sheet.id),
            date_used: Set(m.date_used.unwrap_or(date_of_service)),
            item_description: Set(m.item_description.trim().to_string()),
            quantity: Set(m.quantity),
            unit_cost: Set(m.unit_cost),
            total_cost: Set(workflow::material_total(m.quantity, m.unit_cost)),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    info!(job_sheet_id = %sheet.id, request_id = %request.id, technician_id = %technician.id, "job_sheet_created");
    sheet_view(db, sheet).await
}

/// Technicians see what they filed; customers see sheets on their own requests.
pub async fn list(db: &DatabaseConnection, viewer: &user::Model) -> Result<Vec<JobSheetView>, ServiceError> {
    let sheets = match viewer.role {
        UserRole::Technician => {
            job_sheet::Entity::find()
                .filter(job_sheet::Column::CreatedBy.eq(viewer.id))
                .order_by_desc(job_sheet::Column::CreatedAt)
                .all(db)
                .await?
        }
        role if role.is_customer_like() => {
            let request_ids: Vec<Uuid> = service_request::Entity::find()
                .filter(service_request::Column::CustomerId.eq(viewer.id))
                .all(db)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();
            job_sheet::Entity::find()
                .filter(job_sheet::Column::ServiceRequestId.is_in(request_ids))
                .order_by_desc(job_sheet::Column::CreatedAt)
                .all(db)
                .await?
        }
        _ => return Err(ServiceError::forbidden("Unauthorized")),
    };
    build_sheet_views(db, sheets).await
}

async fn load<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(job_sheet::Model, service_request::Model), ServiceError> {
    let sheet = job_sheet::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Job sheet"))?;
    let request = service_request::Entity::find_by_id(sheet.service_request_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service request"))?;
    Ok((sheet, request))
}

/// Like `load`, but holds a row lock on the sheet until the transaction ends.
async fn load_for_update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<(job_sheet::Model, service_request::Model), ServiceError> {
    let sheet = job_sheet::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Job sheet"))?;
    let request = service_request::Entity::find_by_id(sheet.service_request_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service request"))?;
    Ok((sheet, request))
}

pub async fn detail(db: &DatabaseConnection, viewer: &user::Model, id: Uuid) -> Result<JobSheetView, ServiceError> {
    let (sheet, request) = load(db, id).await?;
    let allowed = match viewer.role {
        UserRole::Technician => sheet.created_by == Some(viewer.id),
        role if role.is_customer_like() => request.customer_id == viewer.id,
        _ => return Err(ServiceError::forbidden("Unauthorized")),
    };
    if !allowed {
        return Err(ServiceError::forbidden("Not authorized to view this job sheet"));
    }
    sheet_view(db, sheet).await
}

pub async fn approve(db: &DatabaseConnection, customer_id: Uuid, id: Uuid) -> Result<JobSheetView, ServiceError> {
    let txn = db.begin().await?;
    let (sheet, request) = load_for_update(&txn, id).await?;
    if request.customer_id != customer_id {
        return Err(ServiceError::forbidden("Not authorized to approve this job sheet"));
    }
    workflow::ensure_job_sheet_pending(sheet.approval_status)?;
    let now = Utc::now();
    let mut am: job_sheet::ActiveModel = sheet.into();
    am.approval_status = Set(ApprovalStatus::Approved);
    am.approved_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(job_sheet_id = %id, %customer_id, "job_sheet_approved");
    sheet_view(db, updated).await
}

pub async fn decline(
    db: &DatabaseConnection,
    customer_id: Uuid,
    id: Uuid,
    reason: Option<String>,
) -> Result<JobSheetView, ServiceError> {
    let txn = db.begin().await?;
    let (sheet, request) = load_for_update(&txn, id).await?;
    if request.customer_id != customer_id {
        return Err(ServiceError::forbidden("Not authorized to decline this job sheet"));
    }
    workflow::ensure_job_sheet_pending(sheet.approval_status)?;
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "No reason provided".to_string());
    let mut am: job_sheet::ActiveModel = sheet.into();
    am.approval_status = Set(ApprovalStatus::Declined);
    am.declined_reason = Set(Some(reason));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(job_sheet_id = %id, %customer_id, "job_sheet_declined");
    sheet_view(db, updated).await
}

/// Approval state of the sheet attached to a request, if one was filed.
pub async fn approval_for_request<C: ConnectionTrait>(
    db: &C,
    service_request_id: Uuid,
) -> Result<Option<ApprovalStatus>, ServiceError> {
    Ok(job_sheet::Entity::find()
        .filter(job_sheet::Column::ServiceRequestId.eq(service_request_id))
        .one(db)
        .await?
        .map(|s| s.approval_status))
}

// ---- staff ----

pub async fn admin_list(db: &DatabaseConnection, filter: JobSheetFilter) -> Result<AdminJobSheetList, ServiceError> {
    let mut query = job_sheet::Entity::find().order_by_desc(job_sheet::Column::CreatedAt);
    if let Some(status) = filter.approval {
        query = query.filter(job_sheet::Column::ApprovalStatus.eq(status));
    }
    if let Some(technician) = filter.technician {
        query = query.filter(job_sheet::Column::CreatedBy.eq(technician));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        let mut cond = Condition::any()
            .add(job_sheet::Column::CustomerName.like(pattern.clone()))
            .add(job_sheet::Column::EquipmentType.like(pattern));
        if let Ok(id) = Uuid::parse_str(search) {
            cond = cond.add(job_sheet::Column::Id.eq(id)).add(job_sheet::Column::ServiceRequestId.eq(id));
        }
        query = query.filter(cond);
    }
    let sheets = query.all(db).await?;
    let job_sheets = build_sheet_views(db, sheets).await?;

    let count = |status: ApprovalStatus| async move {
        job_sheet::Entity::find()
            .filter(job_sheet::Column::ApprovalStatus.eq(status))
            .count(db)
            .await
    };
    let counts = JobSheetCounts {
        pending_count: count(ApprovalStatus::Pending).await?,
        approved_count: count(ApprovalStatus::Approved).await?,
        declined_count: count(ApprovalStatus::Declined).await?,
        total_count: job_sheet::Entity::find().count(db).await?,
    };
    Ok(AdminJobSheetList { job_sheets, counts })
}

pub async fn admin_detail(db: &DatabaseConnection, id: Uuid) -> Result<JobSheetView, ServiceError> {
    let (sheet, _) = load(db, id).await?;
    sheet_view(db, sheet).await
}

pub async fn admin_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = job_sheet::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Job sheet"));
    }
    info!(job_sheet_id = %id, "job_sheet_deleted");
    Ok(())
}

// ---- views ----

async fn sheet_view<C: ConnectionTrait>(db: &C, sheet: job_sheet::Model) -> Result<JobSheetView, ServiceError> {
    build_sheet_views(db, vec![sheet]).await?.pop().ok_or_else(|| ServiceError::not_found("Job sheet"))
}

async fn build_sheet_views<C: ConnectionTrait>(
    db: &C,
    sheets: Vec<job_sheet::Model>,
) -> Result<Vec<JobSheetView>, ServiceError> {
    if sheets.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = sheets.iter().map(|s| s.id).collect();
    let mut materials: HashMap<Uuid, Vec<MaterialView>> = HashMap::new();
    for m in job_sheet_material::Entity::find()
        .filter(job_sheet_material::Column::JobSheetId.is_in(ids))
        .order_by_asc(job_sheet_material::Column::DateUsed)
        .order_by_asc(job_sheet_material::Column::CreatedAt)
        .all(db)
        .await?
    {
        materials.entry(m.job_sheet_id).or_default().push(m.into());
    }

    let requests: HashMap<Uuid, service_request::Model> = service_request::Entity::find()
        .filter(service_request::Column::Id.is_in(sheets.iter().map(|s| s.service_request_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let categories: HashMap<Uuid, String> = service_category::Entity::find()
        .filter(service_category::Column::Id.is_in(requests.values().map(|r| r.service_category_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let technicians: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(sheets.iter().filter_map(|s| s.created_by).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(sheets
        .into_iter()
        .map(|s| {
            let mats = materials.remove(&s.id).unwrap_or_default();
            let total_material_cost = mats.iter().map(|m| m.total_cost).sum();
            let category = requests
                .get(&s.service_request_id)
                .and_then(|r| categories.get(&r.service_category_id))
                .cloned()
                .unwrap_or_default();
            let technician = s.created_by.and_then(|id| technicians.get(&id));
            JobSheetView {
                total_time_taken: s.total_time_display(),
                id: s.id,
                service_request_id: s.service_request_id,
                service_category_name: category,
                customer_name: s.customer_name,
                customer_contact: s.customer_contact,
                service_address: s.service_address,
                equipment_type: s.equipment_type,
                serial_number: s.serial_number,
                equipment_brand: s.equipment_brand,
                equipment_model: s.equipment_model,
                problem_description: s.problem_description,
                work_performed: s.work_performed,
                date_of_service: s.date_of_service,
                start_time: s.start_time,
                finish_time: s.finish_time,
                total_time_minutes: s.total_time_minutes,
                approval_status: s.approval_status,
                declined_reason: s.declined_reason,
                materials: mats,
                total_material_cost,
                technician_id: s.created_by,
                technician_name: technician.map(|t| t.name.clone()),
                technician_phone: technician.and_then(|t| t.phone.clone()),
                created_at: s.created_at,
                updated_at: s.updated_at,
                approved_at: s.approved_at,
            }
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_support::{get_db, make_address, make_service_category, make_user, skip_db};
    use rust_decimal_macros::dec;

    pub(crate) fn sheet_input(service_request_id: Uuid) -> JobSheetInput {
        JobSheetInput {
            service_request_id,
            customer_name: None,
            customer_contact: None,
            service_address: None,
            equipment_type: Some("Split AC".into()),
            serial_number: "SN-001".into(),
            equipment_brand: "Voltas".into(),
            equipment_model: "183V".into(),
            problem_description: Some("Not cooling".into()),
            work_performed: Some("Gas refill and filter clean".into()),
            date_of_service: NaiveDate::from_ymd_opt(2024, 6, 1),
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            finish_time: NaiveTime::from_hms_opt(11, 30, 0),
            materials: vec![
                MaterialInput { date_used: None, item_description: "R32 gas".into(), quantity: dec!(1.5), unit_cost: dec!(800.00) },
                MaterialInput { date_used: None, item_description: "Filter".into(), quantity: dec!(2), unit_cost: dec!(150.25) },
            ],
        }
    }

    /// Customer, technician and an assigned request with a saved location.
    pub(crate) async fn assigned_request(
        db: &DatabaseConnection,
    ) -> anyhow::Result<(user::Model, user::Model, service_request::Model)> {
        let customer = make_user(db, UserRole::Customer).await?;
        let technician = make_user(db, UserRole::Technician).await?;
        let loc = make_address(db, customer.id, true).await?;
        let (cat, issue) = make_service_category(db).await?;
        let now = Utc::now();
        let request = service_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.id),
            technician_id: Set(Some(technician.id)),
            service_category_id: Set(cat.id),
            issue_id: Set(Some(issue.id)),
            custom_description: Set(String::new()),
            service_location_id: Set(Some(loc.id)),
            status: Set(models::ServiceStatus::Assigned),
            request_date: Set(now.into()),
            updated_at: Set(now.into()),
            confirmed_at: Set(None),
        }
        .insert(db)
        .await?;
        Ok((customer, technician, request))
    }

    #[tokio::test]
    async fn create_fills_defaults_and_totals() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;

        let sheet = create(&db, &technician, sheet_input(request.id)).await?;
        assert_eq!(sheet.customer_name, customer.name);
        assert_eq!(sheet.customer_contact, "9876543210");
        assert_eq!(sheet.service_address, "42 Residency Road, Bengaluru, Karnataka - 560025");
        assert_eq!(sheet.total_time_minutes, 90);
        assert_eq!(sheet.total_time_taken, "1h 30m");
        assert_eq!(sheet.approval_status, ApprovalStatus::Pending);
        assert_eq!(sheet.materials.len(), 2);
        assert_eq!(sheet.total_material_cost, dec!(1500.50));

        let dup = create(&db, &technician, sheet_input(request.id)).await.unwrap_err();
        assert_eq!(dup.to_string(), "Job sheet already exists for this service request");
        Ok(())
    }

    #[tokio::test]
    async fn only_assigned_technician_may_file() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, _, request) = assigned_request(&db).await?;
        let other_tech = make_user(&db, UserRole::Technician).await?;

        assert!(matches!(create(&db, &customer, sheet_input(request.id)).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(create(&db, &other_tech, sheet_input(request.id)).await, Err(ServiceError::NotFound(_))));

        let (_, technician, request) = assigned_request(&db).await?;
        let mut backwards = sheet_input(request.id);
        backwards.finish_time = NaiveTime::from_hms_opt(9, 0, 0);
        assert!(create(&db, &technician, backwards).await.is_err());
        let mut missing = sheet_input(request.id);
        missing.work_performed = Some("  ".into());
        assert_eq!(create(&db, &technician, missing).await.unwrap_err().to_string(), "work_performed is required");
        Ok(())
    }

    #[tokio::test]
    async fn approval_is_customer_only_and_one_shot() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;
        let sheet = create(&db, &technician, sheet_input(request.id)).await?;

        let stranger = make_user(&db, UserRole::Customer).await?;
        assert!(matches!(approve(&db, stranger.id, sheet.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(detail(&db, &stranger, sheet.id).await, Err(ServiceError::Forbidden(_))));

        let approved = approve(&db, customer.id, sheet.id).await?;
        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert_eq!(
            decline(&db, customer.id, sheet.id, None).await.unwrap_err().to_string(),
            "Job sheet already approved"
        );
        assert_eq!(approval_for_request(&db, request.id).await?, Some(ApprovalStatus::Approved));

        assert_eq!(list(&db, &technician).await?.len(), 1);
        assert_eq!(list(&db, &customer).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn racing_decisions_settle_on_one_outcome() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;
        let sheet = create(&db, &technician, sheet_input(request.id)).await?;

        let (approved, declined) = tokio::join!(
            approve(&db, customer.id, sheet.id),
            decline(&db, customer.id, sheet.id, Some("Too expensive".into())),
        );
        assert_eq!(approved.is_ok() as u8 + declined.is_ok() as u8, 1);
        let stored = approval_for_request(&db, request.id).await?;
        if approved.is_ok() {
            assert_eq!(stored, Some(ApprovalStatus::Approved));
        } else {
            assert_eq!(stored, Some(ApprovalStatus::Declined));
        }
        Ok(())
    }

    #[tokio::test]
    async fn decline_defaults_reason_and_admin_counts() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (customer, technician, request) = assigned_request(&db).await?;
        let sheet = create(&db, &technician, sheet_input(request.id)).await?;
        let declined = decline(&db, customer.id, sheet.id, Some("   ".into())).await?;
        assert_eq!(declined.declined_reason.as_deref(), Some("No reason provided"));

        let listed = admin_list(
            &db,
            JobSheetFilter { approval: Some(ApprovalStatus::Declined), technician: Some(technician.id), search: None },
        )
        .await?;
        assert_eq!(listed.job_sheets.len(), 1);
        assert!(listed.counts.declined_count >= 1);
        assert!(listed.counts.total_count >= listed.counts.declined_count);

        admin_delete(&db, sheet.id).await?;
        assert!(matches!(admin_detail(&db, sheet.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
