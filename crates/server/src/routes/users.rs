use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use common::types::Message;
use service::users::{self, ProfileCompleteness, ProfileUpdate, UserView};

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct ChangePasswordInput {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct DeleteAccountInput {
    #[serde(default)]
    pub password: String,
}

#[utoipa::path(get, path = "/api/users/me", tag = "users", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserView> {
    Json(user.into())
}

pub async fn get_profile(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(users::get_profile(&state.db, user.id).await?))
}

pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(users::update_profile(&state.db, user.id, input).await?))
}

pub async fn validate_profile(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ProfileCompleteness>, JsonApiError> {
    Ok(Json(users::validate_profile(&state.db, user.id).await?))
}

pub async fn change_password(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<Json<Message>, JsonApiError> {
    state.auth.change_password(user.id, &input.current_password, &input.new_password).await?;
    Ok(Json(Message::new("Password changed successfully")))
}

/// Soft delete: the account is deactivated after the password is re-checked.
pub async fn delete_account(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<DeleteAccountInput>,
) -> Result<Json<Message>, JsonApiError> {
    state.auth.deactivate(user.id, &input.password).await?;
    Ok(Json(Message::new("Account deleted successfully")))
}
