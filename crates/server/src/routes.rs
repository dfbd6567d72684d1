use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::observability::{encode_metrics, REQUEST_DURATION};
use crate::openapi::ApiDoc;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod job_sheets;
pub mod orders;
pub mod ratings;
pub mod services;
pub mod technician;
pub mod users;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    encode_metrics()
}

async fn track_duration(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let res = next.run(req).await;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
    res
}

/// Build the full application router: public, authenticated and staff routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/google/callback", post(auth::google_callback))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:slug", get(catalog::product_detail))
        .route("/api/service-categories", get(catalog::service_categories));

    let api = Router::new()
        .route("/api/users/me", get(users::me))
        .route("/api/users/profile", get(users::get_profile).patch(users::update_profile))
        .route("/api/users/profile/validate", get(users::validate_profile))
        .route("/api/users/change-password", post(users::change_password))
        .route("/api/users/delete-account", post(users::delete_account))
        .route("/api/addresses", get(addresses::list).post(addresses::create))
        .route("/api/addresses/:id", patch(addresses::update).delete(addresses::delete))
        .route("/api/orders", get(orders::list).post(orders::place))
        .route("/api/orders/bulk", post(orders::place_bulk))
        .route("/api/orders/:id", get(orders::detail))
        .route("/api/orders/:id/confirm", post(orders::confirm))
        .route("/api/orders/:id/cancel", post(orders::cancel))
        .route("/api/service-requests", get(services::history).post(services::create))
        .route("/api/service-requests/:id/confirm", post(services::confirm))
        .route("/api/service-requests/:id/complete", patch(services::complete))
        .route("/api/ratings", post(ratings::create))
        .route("/api/ratings/mine", get(ratings::mine))
        .route("/api/job-sheets", get(job_sheets::list).post(job_sheets::create))
        .route("/api/job-sheets/:id", get(job_sheets::detail))
        .route("/api/job-sheets/:id/approve", post(job_sheets::approve))
        .route("/api/job-sheets/:id/decline", post(job_sheets::decline))
        .route("/api/technician/orders", get(technician::assigned_orders))
        .route("/api/technician/orders/:id/complete", post(technician::complete_order))
        .route("/api/technician/services", get(technician::assigned_services))
        .route("/api/technician/services/:id/complete", post(technician::complete_service))
        .route("/api/technician/stats", get(technician::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    // layers run bottom-up: authenticate first, then check staff
    let staff = Router::new()
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route("/admin/users/:id", get(admin::get_user).patch(admin::update_user).delete(admin::delete_user))
        .route("/admin/products", get(admin::list_products).post(admin::create_product))
        .route(
            "/admin/products/:id",
            get(admin::get_product).put(admin::update_product).delete(admin::delete_product),
        )
        .route("/admin/products/:id/images", post(admin::add_product_image))
        .route("/admin/products/:id/specifications", put(admin::upsert_specification))
        .route("/admin/product-images/:id", delete(admin::delete_product_image))
        .route("/admin/categories", get(admin::list_categories).post(admin::create_category))
        .route("/admin/categories/:id", put(admin::update_category).delete(admin::delete_category))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/:id", get(admin::order_detail).delete(admin::delete_order))
        .route("/admin/orders/:id/assign", post(admin::assign_order))
        .route("/admin/orders/:id/status", post(admin::update_order_status))
        .route("/admin/services", get(admin::list_services))
        .route("/admin/services/:id", get(admin::service_detail))
        .route("/admin/services/:id/assign", post(admin::assign_service))
        .route("/admin/services/:id/status", post(admin::update_service_status))
        .route(
            "/admin/service-categories",
            get(admin::list_service_categories).post(admin::create_service_category),
        )
        .route(
            "/admin/service-categories/:id",
            put(admin::update_service_category).delete(admin::delete_service_category),
        )
        .route("/admin/job-sheets", get(admin::list_job_sheets))
        .route("/admin/job-sheets/:id", get(admin::job_sheet_detail).delete(admin::delete_job_sheet))
        .route_layer(middleware::from_fn(auth::require_staff))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    public
        .merge(api)
        .merge(staff)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(middleware::from_fn(track_duration))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
