use axum::{extract::State, http::StatusCode, Extension, Json};

use service::ratings::{self, RatingInput, RatingView};

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<RatingInput>,
) -> Result<(StatusCode, Json<RatingView>), JsonApiError> {
    let created = ratings::create_rating(&state.db, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn mine(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<RatingView>>, JsonApiError> {
    Ok(Json(ratings::my_ratings(&state.db, user.id).await?))
}
