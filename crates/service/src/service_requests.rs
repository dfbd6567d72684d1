//! Field-service requests raised by customers and AMC subscribers.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use models::{
    address, amc_free_category, job_sheet, service_category, service_issue, service_request, technician_rating, user,
    ApprovalStatus, ServiceStatus, UserRole,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::addresses::find_owned;
use crate::errors::ServiceError;
use crate::users::{find_user, has_free_service};
use crate::workflow::{self, SERVICE_FEE};

#[derive(Debug, Clone, Serialize)]
pub struct IssueView {
    pub id: Uuid,
    pub description: String,
    pub price: Decimal,
}

impl From<service_issue::Model> for IssueView {
    fn from(i: service_issue::Model) -> Self {
        Self { id: i.id, description: i.description, price: i.price }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCategoryView {
    pub id: Uuid,
    pub name: String,
    pub issues: Vec<IssueView>,
    pub is_free_for_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceRequest {
    pub service_category: Uuid,
    pub issue: Option<Uuid>,
    #[serde(default)]
    pub custom_description: String,
    pub service_location: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedServiceRequest {
    pub id: Uuid,
    pub customer: String,
    pub service_category: Uuid,
    pub issue: Option<Uuid>,
    pub custom_description: String,
    pub service_location: Option<Uuid>,
    pub status: ServiceStatus,
    pub requires_payment: bool,
    pub service_fee: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationView {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl From<address::Model> for LocationView {
    fn from(a: address::Model) -> Self {
        Self { street_address: a.street_address, city: a.city, state: a.state, pincode: a.pincode }
    }
}

/// A request joined with its category, issue, location and people.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequestView {
    pub id: Uuid,
    pub service_category_id: Uuid,
    pub service_category_name: String,
    pub issue_id: Option<Uuid>,
    pub issue_description: Option<String>,
    pub issue_price: Option<Decimal>,
    pub custom_description: String,
    pub service_location: Option<LocationView>,
    pub request_date: chrono::DateTime<chrono::FixedOffset>,
    pub confirmed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub status: ServiceStatus,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub technician_id: Option<Uuid>,
    pub technician_name: Option<String>,
    pub technician_phone: Option<String>,
    pub can_rate: bool,
}

/// Categories with their issues; `is_free_for_user` is only ever true for AMC viewers.
pub async fn list_categories(
    db: &DatabaseConnection,
    viewer: Option<&user::Model>,
) -> Result<Vec<ServiceCategoryView>, ServiceError> {
    let categories = service_category::Entity::find()
        .order_by_asc(service_category::Column::Name)
        .all(db)
        .await?;
    let mut issues: HashMap<Uuid, Vec<IssueView>> = HashMap::new();
    for issue in service_issue::Entity::find()
        .order_by_asc(service_issue::Column::Description)
        .all(db)
        .await?
    {
        issues.entry(issue.category_id).or_default().push(issue.into());
    }
    let free: HashSet<Uuid> = match viewer {
        Some(u) if u.role == UserRole::Amc => {
            amc_free_category::category_ids_for_user(db, u.id).await?.into_iter().collect()
        }
        _ => HashSet::new(),
    };
    Ok(categories
        .into_iter()
        .map(|c| ServiceCategoryView {
            is_free_for_user: free.contains(&c.id),
            issues: issues.remove(&c.id).unwrap_or_default(),
            id: c.id,
            name: c.name,
        })
        .collect())
}

pub async fn create_request(
    db: &DatabaseConnection,
    customer_id: Uuid,
    input: NewServiceRequest,
) -> Result<CreatedServiceRequest, ServiceError> {
    let customer = find_user(db, customer_id).await?;
    let category = service_category::Entity::find_by_id(input.service_category)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("Invalid service category"))?;
    if let Some(issue_id) = input.issue {
        let issue = service_issue::Entity::find_by_id(issue_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::validation("Invalid issue"))?;
        if issue.category_id != category.id {
            return Err(ServiceError::validation("Issue does not belong to the selected service category"));
        }
    } else if input.custom_description.trim().is_empty() {
        return Err(ServiceError::validation("Select an issue or describe the problem"));
    }
    if let Some(location_id) = input.service_location {
        find_owned(db, customer_id, location_id)
            .await
            .map_err(|_| ServiceError::validation("Invalid service location"))?;
    }

    let now = Utc::now();
    let created = service_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        technician_id: Set(None),
        service_category_id: Set(category.id),
        issue_id: Set(input.issue),
        custom_description: Set(input.custom_description.trim().to_string()),
        service_location_id: Set(input.service_location),
        status: Set(ServiceStatus::Submitted),
        request_date: Set(now.into()),
        updated_at: Set(now.into()),
        confirmed_at: Set(None),
    }
    .insert(db)
    .await?;

    let free = has_free_service(db, &customer, category.id).await?;
    info!(request_id = %created.id, %customer_id, category = %category.name, free, "service_request_created");
    Ok(CreatedServiceRequest {
        id: created.id,
        customer: customer.email,
        service_category: created.service_category_id,
        issue: created.issue_id,
        custom_description: created.custom_description,
        service_location: created.service_location_id,
        status: created.status,
        requires_payment: !free,
        service_fee: if free { Decimal::ZERO } else { SERVICE_FEE },
    })
}

/// Post-payment confirmation: stamps `confirmed_at` once, while the request still awaits assignment.
pub async fn confirm_request(
    db: &DatabaseConnection,
    customer_id: Uuid,
    id: Uuid,
) -> Result<ServiceRequestView, ServiceError> {
    let found = service_request::Entity::find_by_id(id)
        .filter(service_request::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service request"))?;
    if found.status != ServiceStatus::Submitted {
        return Err(ServiceError::invalid_state(format!(
            "Service request is already {}",
            found.status.as_str().to_lowercase()
        )));
    }
    if found.confirmed_at.is_some() {
        return Err(ServiceError::invalid_state("Service request already confirmed"));
    }
    let now = Utc::now();
    let mut am: service_request::ActiveModel = found.into();
    am.confirmed_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    let updated = am.update(db).await?;
    info!(request_id = %id, %customer_id, "service_request_confirmed");
    request_view(db, updated).await
}

/// The caller's requests, newest first.
pub async fn history(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<ServiceRequestView>, ServiceError> {
    let rows = service_request::Entity::find()
        .filter(service_request::Column::CustomerId.eq(customer_id))
        .order_by_desc(service_request::Column::RequestDate)
        .all(db)
        .await?;
    build_request_views(db, rows).await
}

pub async fn request_view<C: ConnectionTrait>(
    db: &C,
    r: service_request::Model,
) -> Result<ServiceRequestView, ServiceError> {
    build_request_views(db, vec![r])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Service request"))
}

pub async fn build_request_views<C: ConnectionTrait>(
    db: &C,
    rows: Vec<service_request::Model>,
) -> Result<Vec<ServiceRequestView>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let categories: HashMap<Uuid, String> = service_category::Entity::find()
        .filter(service_category::Column::Id.is_in(rows.iter().map(|r| r.service_category_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let issues: HashMap<Uuid, service_issue::Model> = service_issue::Entity::find()
        .filter(service_issue::Column::Id.is_in(rows.iter().filter_map(|r| r.issue_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    let locations: HashMap<Uuid, address::Model> = address::Entity::find()
        .filter(address::Column::Id.is_in(rows.iter().filter_map(|r| r.service_location_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let people_ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|r| [Some(r.customer_id), r.technician_id])
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
        .filter(technician_rating::Column::ServiceRequestId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .filter_map(|r| r.service_request_id)
        .collect();

    Ok(rows
        .into_iter()
        .map(|r| {
            let issue = r.issue_id.and_then(|id| issues.get(&id));
            let customer = people.get(&r.customer_id);
            let technician = r.technician_id.and_then(|id| people.get(&id));
            ServiceRequestView {
                id: r.id,
                service_category_id: r.service_category_id,
                service_category_name: categories.get(&r.service_category_id).cloned().unwrap_or_default(),
                issue_id: r.issue_id,
                issue_description: issue.map(|i| i.description.clone()),
                issue_price: issue.map(|i| i.price),
                custom_description: r.custom_description,
                service_location: r
                    .service_location_id
                    .and_then(|id| locations.get(&id).cloned())
                    .map(LocationView::from),
                request_date: r.request_date,
                confirmed_at: r.confirmed_at,
                status: r.status,
                customer_id: r.customer_id,
                customer_name: customer.map(|c| c.name.clone()),
                customer_phone: customer.and_then(|c| c.phone.clone()),
                customer_email: customer.map(|c| c.email.clone()),
                technician_id: r.technician_id,
                technician_name: technician.map(|t| t.name.clone()),
                technician_phone: technician.and_then(|t| t.phone.clone()),
                can_rate: workflow::can_rate_service(r.status, r.technician_id, rated.contains(&r.id)),
            }
        })
        .collect())
}

/// A request view plus the state of its job sheet, as technicians and staff see it.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithJobSheet {
    #[serde(flatten)]
    pub request: ServiceRequestView,
    pub has_job_sheet: bool,
    pub job_sheet_status: Option<ApprovalStatus>,
    pub job_sheet_id: Option<Uuid>,
}

pub async fn with_job_sheets<C: ConnectionTrait>(
    db: &C,
    rows: Vec<service_request::Model>,
) -> Result<Vec<RequestWithJobSheet>, ServiceError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let sheets: HashMap<Uuid, job_sheet::Model> = job_sheet::Entity::find()
        .filter(job_sheet::Column::ServiceRequestId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.service_request_id, s))
        .collect();
    Ok(build_request_views(db, rows)
        .await?
        .into_iter()
        .map(|request| {
            let sheet = sheets.get(&request.id);
            RequestWithJobSheet {
                has_job_sheet: sheet.is_some(),
                job_sheet_status: sheet.map(|s| s.approval_status),
                job_sheet_id: sheet.map(|s| s.id),
                request,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_address, make_service_category, make_user, skip_db};
    use crate::users::{update_user, AdminUserUpdate};

    #[tokio::test]
    async fn fee_depends_on_amc_entitlement() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (cat, issue) = make_service_category(&db).await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let amc = make_user(&db, UserRole::Amc).await?;
        update_user(&db, amc.id, AdminUserUpdate { free_service_categories: Some(vec![cat.id]), ..Default::default() }).await?;

        let input = NewServiceRequest {
            service_category: cat.id,
            issue: Some(issue.id),
            custom_description: String::new(),
            service_location: None,
        };
        let paid = create_request(&db, customer.id, input.clone()).await?;
        assert!(paid.requires_payment);
        assert_eq!(paid.service_fee, SERVICE_FEE);
        assert_eq!(paid.status, ServiceStatus::Submitted);

        let free = create_request(&db, amc.id, input).await?;
        assert!(!free.requires_payment);
        assert_eq!(free.service_fee, Decimal::ZERO);

        let cats = list_categories(&db, Some(&amc)).await?;
        let mine = cats.iter().find(|c| c.id == cat.id).map(|c| c.is_free_for_user);
        assert_eq!(mine, Some(true));
        let anon = list_categories(&db, None).await?;
        assert!(anon.iter().all(|c| !c.is_free_for_user));
        Ok(())
    }

    #[tokio::test]
    async fn issue_and_location_must_match() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (cat, _) = make_service_category(&db).await?;
        let (_, other_issue) = make_service_category(&db).await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let stranger = make_user(&db, UserRole::Customer).await?;
        let foreign = make_address(&db, stranger.id, true).await?;

        let wrong_issue = NewServiceRequest {
            service_category: cat.id,
            issue: Some(other_issue.id),
            custom_description: String::new(),
            service_location: None,
        };
        assert!(create_request(&db, customer.id, wrong_issue).await.is_err());

        let wrong_location = NewServiceRequest {
            service_category: cat.id,
            issue: None,
            custom_description: "Fan making noise".into(),
            service_location: Some(foreign.id),
        };
        assert_eq!(
            create_request(&db, customer.id, wrong_location).await.unwrap_err().to_string(),
            "Invalid service location"
        );

        let nothing = NewServiceRequest { service_category: cat.id, issue: None, custom_description: " ".into(), service_location: None };
        assert!(create_request(&db, customer.id, nothing).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn history_is_newest_first_and_confirm_is_owner_only() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let (cat, issue) = make_service_category(&db).await?;
        let customer = make_user(&db, UserRole::Customer).await?;
        let loc = make_address(&db, customer.id, true).await?;
        let input = NewServiceRequest {
            service_category: cat.id,
            issue: Some(issue.id),
            custom_description: String::new(),
            service_location: Some(loc.id),
        };
        let first = create_request(&db, customer.id, input.clone()).await?;
        let second = create_request(&db, customer.id, input).await?;

        let rows = history(&db, customer.id).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].issue_description.as_deref(), Some("Not cooling"));
        assert_eq!(rows[1].service_location.as_ref().map(|l| l.city.as_str()), Some("Bengaluru"));
        assert!(!rows[1].can_rate);

        let other = make_user(&db, UserRole::Customer).await?;
        assert!(matches!(confirm_request(&db, other.id, first.id).await, Err(ServiceError::NotFound(_))));
        assert!(rows[1].confirmed_at.is_none());
        let confirmed = confirm_request(&db, customer.id, first.id).await?;
        assert_eq!(confirmed.status, ServiceStatus::Submitted);
        assert!(confirmed.confirmed_at.is_some());
        let again = confirm_request(&db, customer.id, first.id).await.unwrap_err();
        assert_eq!(again.to_string(), "Service request already confirmed");
        Ok(())
    }
}
