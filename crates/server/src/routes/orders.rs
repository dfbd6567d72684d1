use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::orders::{self, OrderLine, OrderView};

use crate::errors::JsonApiError;
use crate::observability::ORDERS_PLACED_TOTAL;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct PlaceOrderInput {
    pub product_slug: String,
    #[serde(default = "one")]
    pub quantity: i32,
    pub address_id: Option<Uuid>,
}

fn one() -> i32 { 1 }

#[derive(Deserialize)]
pub struct BulkOrderInput {
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub address_id: Option<Uuid>,
}

fn address_required(id: Option<Uuid>) -> Result<Uuid, JsonApiError> {
    id.ok_or_else(|| JsonApiError::bad_request("Items and address are required"))
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderView>>, JsonApiError> {
    Ok(Json(orders::list_orders(&state.db, user.id).await?))
}

pub async fn detail(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(orders::get_order(&state.db, user.id, id).await?))
}

#[utoipa::path(post, path = "/api/orders", tag = "orders", request_body = crate::openapi::PlaceOrderRequest, responses((status = 201, description = "Order placed"), (status = 400, description = "Bad Request")))]
pub async fn place(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<PlaceOrderInput>,
) -> Result<(StatusCode, Json<OrderView>), JsonApiError> {
    let address_id = input
        .address_id
        .ok_or_else(|| JsonApiError::bad_request("Product and address are required"))?;
    let placed = orders::place_order(&state.db, user.id, &input.product_slug, input.quantity, address_id).await?;
    ORDERS_PLACED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(placed)))
}

pub async fn place_bulk(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<BulkOrderInput>,
) -> Result<(StatusCode, Json<OrderView>), JsonApiError> {
    let address_id = address_required(input.address_id)?;
    let placed = orders::place_bulk_order(&state.db, user.id, address_id, input.items).await?;
    ORDERS_PLACED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(placed)))
}

pub async fn confirm(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(orders::confirm_order(&state.db, user.id, id).await?))
}

pub async fn cancel(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(orders::cancel_order(&state.db, user.id, id).await?))
}
