//! Staff console endpoints. Mounted behind `require_user` and `require_staff`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{product_image, product_specification, OrderStatus, ServiceStatus, UserRole};
use service::admin::{
    self, AdminServiceCategory, DashboardStats, OrderFilter, OrderList, ServiceCategoryInput, ServiceFilter,
    ServiceList,
};
use service::auth::domain::{AuthUser, NewAccount};
use service::catalog::{self, CategoryView, ImageInput, ProductFilter, ProductInput, ProductView, SpecInput};
use service::job_sheets::{self, AdminJobSheetList, JobSheetFilter, JobSheetView};
use service::orders::OrderView;
use service::service_requests::{RequestWithJobSheet, ServiceRequestView};
use service::users::{self, AdminUserUpdate, AdminUserView};

use crate::errors::JsonApiError;
use crate::observability::SERVICES_COMPLETED_TOTAL;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct RoleQuery {
    pub role: Option<UserRole>,
}

#[derive(Deserialize)]
pub struct NewUserInput {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignInput {
    pub technician_id: Uuid,
}

#[derive(Deserialize)]
pub struct OrderStatusInput {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ServiceStatusInput {
    pub status: ServiceStatus,
}

#[utoipa::path(get, path = "/admin/stats", tag = "admin", responses((status = 200, description = "Dashboard counters"), (status = 403, description = "Staff only")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<DashboardStats>, JsonApiError> {
    Ok(Json(admin::dashboard(&state.db).await?))
}

// users

pub async fn list_users(
    State(state): State<ServerState>,
    Query(q): Query<RoleQuery>,
) -> Result<Json<Vec<AdminUserView>>, JsonApiError> {
    Ok(Json(users::list_users(&state.db, q.role).await?))
}

pub async fn create_user(
    State(state): State<ServerState>,
    Json(input): Json<NewUserInput>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let created = state
        .auth
        .create_account(NewAccount {
            email: input.email,
            name: input.name,
            password: input.password,
            phone: input.phone,
            is_staff: input.is_staff || input.role == UserRole::Admin,
            role: input.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminUserView>, JsonApiError> {
    Ok(Json(users::get_user_admin(&state.db, id).await?))
}

pub async fn update_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdminUserUpdate>,
) -> Result<Json<AdminUserView>, JsonApiError> {
    Ok(Json(users::update_user(&state.db, id, input).await?))
}

pub async fn delete_user(
    State(state): State<ServerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    users::delete_user(&state.db, actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// products

pub async fn list_products(
    State(state): State<ServerState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductView>>, JsonApiError> {
    Ok(Json(catalog::admin_list_products(&state.db, filter).await?))
}

pub async fn create_product(
    State(state): State<ServerState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductView>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(catalog::create_product(&state.db, input).await?)))
}

pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>, JsonApiError> {
    Ok(Json(catalog::admin_get_product(&state.db, id).await?))
}

pub async fn update_product(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ProductView>, JsonApiError> {
    Ok(Json(catalog::update_product(&state.db, id, input).await?))
}

pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog::delete_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_product_image(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ImageInput>,
) -> Result<(StatusCode, Json<product_image::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(catalog::add_product_image(&state.db, id, input).await?)))
}

pub async fn delete_product_image(
    State(state): State<ServerState>,
    Path(image_id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog::delete_product_image(&state.db, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upsert_specification(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SpecInput>,
) -> Result<Json<product_specification::Model>, JsonApiError> {
    Ok(Json(catalog::upsert_specification(&state.db, id, input).await?))
}

// product categories

pub async fn list_categories(State(state): State<ServerState>) -> Result<Json<Vec<CategoryView>>, JsonApiError> {
    Ok(Json(catalog::list_categories(&state.db).await?))
}

pub async fn create_category(
    State(state): State<ServerState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryView>), JsonApiError> {
    let created = catalog::create_category(&state.db, &input.name, input.slug.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<CategoryView>, JsonApiError> {
    Ok(Json(catalog::update_category(&state.db, id, &input.name, input.slug.as_deref()).await?))
}

pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// orders

pub async fn list_orders(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<OrderList>, JsonApiError> {
    Ok(Json(admin::list_orders(&state.db, filter).await?))
}

pub async fn order_detail(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(admin::order_detail(&state.db, id).await?))
}

pub async fn assign_order(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignInput>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(admin::assign_order_technician(&state.db, id, input.technician_id).await?))
}

pub async fn update_order_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<OrderStatusInput>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(admin::update_order_status(&state.db, id, input.status).await?))
}

pub async fn delete_order(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    admin::delete_order(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// service requests

pub async fn list_services(
    State(state): State<ServerState>,
    Query(filter): Query<ServiceFilter>,
) -> Result<Json<ServiceList>, JsonApiError> {
    Ok(Json(admin::list_services(&state.db, filter).await?))
}

pub async fn service_detail(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestWithJobSheet>, JsonApiError> {
    Ok(Json(admin::service_detail(&state.db, id).await?))
}

pub async fn assign_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignInput>,
) -> Result<Json<ServiceRequestView>, JsonApiError> {
    Ok(Json(admin::assign_service_technician(&state.db, id, input.technician_id).await?))
}

pub async fn update_service_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ServiceStatusInput>,
) -> Result<Json<ServiceRequestView>, JsonApiError> {
    let updated = admin::update_service_status(&state.db, id, input.status).await?;
    if input.status == ServiceStatus::Completed {
        SERVICES_COMPLETED_TOTAL.inc();
    }
    Ok(Json(updated))
}

// service categories

pub async fn list_service_categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<AdminServiceCategory>>, JsonApiError> {
    Ok(Json(admin::list_service_categories(&state.db).await?))
}

pub async fn create_service_category(
    State(state): State<ServerState>,
    Json(input): Json<ServiceCategoryInput>,
) -> Result<(StatusCode, Json<AdminServiceCategory>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(admin::create_service_category(&state.db, input).await?)))
}

pub async fn update_service_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ServiceCategoryInput>,
) -> Result<Json<AdminServiceCategory>, JsonApiError> {
    Ok(Json(admin::update_service_category(&state.db, id, input).await?))
}

pub async fn delete_service_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    admin::delete_service_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// job sheets

pub async fn list_job_sheets(
    State(state): State<ServerState>,
    Query(filter): Query<JobSheetFilter>,
) -> Result<Json<AdminJobSheetList>, JsonApiError> {
    Ok(Json(job_sheets::admin_list(&state.db, filter).await?))
}

pub async fn job_sheet_detail(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobSheetView>, JsonApiError> {
    Ok(Json(job_sheets::admin_detail(&state.db, id).await?))
}

pub async fn delete_job_sheet(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    job_sheets::admin_delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
