use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use models::address;
use service::addresses::{self, AddressInput, AddressPatch};

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<address::Model>>, JsonApiError> {
    Ok(Json(addresses::list_addresses(&state.db, user.id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<address::Model>), JsonApiError> {
    let created = addresses::create_address(&state.db, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AddressPatch>,
) -> Result<Json<address::Model>, JsonApiError> {
    Ok(Json(addresses::update_address(&state.db, user.id, id, patch).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    addresses::delete_address(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
