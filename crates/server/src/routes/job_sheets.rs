use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::job_sheets::{self, JobSheetInput, JobSheetView};

use crate::errors::JsonApiError;
use crate::observability::JOB_SHEET_EVENTS_TOTAL;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Deserialize, Default)]
pub struct DeclineInput {
    pub reason: Option<String>,
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<JobSheetInput>,
) -> Result<(StatusCode, Json<JobSheetView>), JsonApiError> {
    let created = job_sheets::create(&state.db, &user, input).await?;
    JOB_SHEET_EVENTS_TOTAL.with_label_values(&["created"]).inc();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<JobSheetView>>, JsonApiError> {
    Ok(Json(job_sheets::list(&state.db, &user).await?))
}

pub async fn detail(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobSheetView>, JsonApiError> {
    Ok(Json(job_sheets::detail(&state.db, &user, id).await?))
}

pub async fn approve(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobSheetView>, JsonApiError> {
    let approved = job_sheets::approve(&state.db, user.id, id).await?;
    JOB_SHEET_EVENTS_TOTAL.with_label_values(&["approved"]).inc();
    Ok(Json(approved))
}

/// The body is optional; a missing reason is recorded as "No reason provided".
pub async fn decline(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    body: Option<Json<DeclineInput>>,
) -> Result<Json<JobSheetView>, JsonApiError> {
    let reason = body.and_then(|Json(b)| b.reason);
    let declined = job_sheets::decline(&state.db, user.id, id, reason).await?;
    JOB_SHEET_EVENTS_TOTAL.with_label_values(&["declined"]).inc();
    Ok(Json(declined))
}
