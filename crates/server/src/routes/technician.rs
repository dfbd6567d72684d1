use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use common::types::Message;
use service::orders::OrderView;
use service::service_requests::RequestWithJobSheet;
use service::technician::{self, TechnicianStats};

use crate::errors::JsonApiError;
use crate::observability::SERVICES_COMPLETED_TOTAL;
use crate::routes::auth::{CurrentUser, ServerState};

pub async fn assigned_orders(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderView>>, JsonApiError> {
    Ok(Json(technician::assigned_orders(&state.db, &user).await?))
}

pub async fn assigned_services(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<RequestWithJobSheet>>, JsonApiError> {
    Ok(Json(technician::assigned_services(&state.db, &user).await?))
}

pub async fn stats(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<TechnicianStats>, JsonApiError> {
    Ok(Json(technician::stats(&state.db, &user).await?))
}

pub async fn complete_order(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    technician::complete_order(&state.db, &user, id).await?;
    Ok(Json(Message::new("Order marked as delivered")))
}

pub async fn complete_service(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    technician::complete_service(&state.db, &user, id).await?;
    SERVICES_COMPLETED_TOTAL.inc();
    Ok(Json(Message::new("Service marked as completed")))
}
