use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use service::catalog::{self, ProductDetail, ProductView};
use service::service_requests::{self, ServiceCategoryView};

use crate::errors::JsonApiError;
use crate::routes::auth::{optional_user, ServerState};

#[utoipa::path(get, path = "/api/products", tag = "catalog", responses((status = 200, description = "Active products")))]
pub async fn list_products(State(state): State<ServerState>) -> Result<Json<Vec<ProductView>>, JsonApiError> {
    Ok(Json(catalog::list_products(&state.db).await?))
}

#[utoipa::path(get, path = "/api/products/{slug}", tag = "catalog", params(("slug" = String, Path, description = "Product slug")), responses((status = 200, description = "Product detail"), (status = 404, description = "Not Found")))]
pub async fn product_detail(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, JsonApiError> {
    Ok(Json(catalog::product_detail(&state.db, &slug).await?))
}

/// Public, but a signed-in AMC customer sees which categories are free for them.
#[utoipa::path(get, path = "/api/service-categories", tag = "catalog", responses((status = 200, description = "Service categories with issues")))]
pub async fn service_categories(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServiceCategoryView>>, JsonApiError> {
    let viewer = optional_user(&state, &headers).await;
    Ok(Json(service_requests::list_categories(&state.db, viewer.as_ref()).await?))
}
