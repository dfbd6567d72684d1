use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use common::types::Message;
use service::service_requests::{self, CreatedServiceRequest, NewServiceRequest, ServiceRequestView};
use service::technician;

use crate::errors::JsonApiError;
use crate::observability::{SERVICES_COMPLETED_TOTAL, SERVICE_REQUESTS_TOTAL};
use crate::routes::auth::{CurrentUser, ServerState};

#[utoipa::path(post, path = "/api/service-requests", tag = "services", request_body = crate::openapi::ServiceRequestRequest, responses((status = 201, description = "Request raised"), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<NewServiceRequest>,
) -> Result<(StatusCode, Json<CreatedServiceRequest>), JsonApiError> {
    let created = service_requests::create_request(&state.db, user.id, input).await?;
    SERVICE_REQUESTS_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn confirm(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceRequestView>, JsonApiError> {
    Ok(Json(service_requests::confirm_request(&state.db, user.id, id).await?))
}

pub async fn history(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ServiceRequestView>>, JsonApiError> {
    Ok(Json(service_requests::history(&state.db, user.id).await?))
}

/// Assigned technician closes the job; needs an approved job sheet.
#[utoipa::path(patch, path = "/api/service-requests/{id}/complete", tag = "services", params(("id" = Uuid, Path, description = "Service request id")), responses((status = 200, description = "Completed"), (status = 400, description = "Job sheet missing, pending or declined"), (status = 403, description = "Not a technician")))]
pub async fn complete(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    technician::complete_service(&state.db, &user, id).await?;
    SERVICES_COMPLETED_TOTAL.inc();
    Ok(Json(Message::new("Service marked as completed")))
}
