use rust_decimal::Decimal;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String, pub phone: Option<String> }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct PlaceOrderRequest { pub product_slug: String, pub quantity: i32, pub address_id: Uuid }

#[derive(ToSchema)]
pub struct ServiceRequestRequest {
    pub service_category: Uuid,
    pub issue: Option<Uuid>,
    pub custom_description: Option<String>,
    pub service_location: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub stock: i32,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::users::me,
        crate::routes::catalog::list_products,
        crate::routes::catalog::product_detail,
        crate::routes::catalog::service_categories,
        crate::routes::orders::place,
        crate::routes::services::create,
        crate::routes::services::complete,
        crate::routes::admin::stats,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            PlaceOrderRequest,
            ServiceRequestRequest,
            ProductSummary,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "catalog"),
        (name = "orders"),
        (name = "services"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
