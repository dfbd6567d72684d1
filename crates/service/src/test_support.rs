#![cfg(test)]
use chrono::Utc;
use migration::MigratorTrait;
use models::db::{connect_with_config, database_config};
use models::{address, product, product_category, service_category, service_issue, user, UserRole};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// `true` when DB-backed tests should be skipped.
pub fn skip_db() -> bool {
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let mut cfg = database_config();
            cfg.max_connections = cfg.max_connections.max(10);
            cfg.min_connections = cfg.min_connections.min(1);
            let Ok(db) = connect_with_config(&cfg).await else { return false };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !migrated {
        return Err(anyhow::anyhow!("database unavailable or migrations failed"));
    }

    // Return a fresh connection for the current test's runtime
    let mut cfg = database_config();
    cfg.max_connections = cfg.max_connections.max(20);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    let db = connect_with_config(&cfg).await?;
    Ok(db)
}

pub async fn make_user(db: &DatabaseConnection, role: UserRole) -> anyhow::Result<user::Model> {
    Ok(user::create(
        db,
        user::NewUser {
            email: format!("{}_{}@example.com", role.as_str().to_lowercase(), Uuid::new_v4().simple()),
            name: format!("Test {}", role.as_str().to_lowercase()),
            phone: Some("9876543210".into()),
            role,
            is_staff: role == UserRole::Admin,
        },
    )
    .await?)
}

pub async fn make_address(db: &DatabaseConnection, user_id: Uuid, is_default: bool) -> anyhow::Result<address::Model> {
    Ok(address::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        street_address: Set("42 Residency Road".into()),
        city: Set("Bengaluru".into()),
        state: Set("Karnataka".into()),
        pincode: Set("560025".into()),
        is_default: Set(is_default),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?)
}

pub async fn make_product(db: &DatabaseConnection, price: Decimal, stock: i32) -> anyhow::Result<product::Model> {
    let suffix = Uuid::new_v4().simple().to_string();
    let cat = product_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Appliances {suffix}")),
        slug: Set(format!("appliances-{suffix}")),
    }
    .insert(db)
    .await?;
    let now = Utc::now();
    Ok(product::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(cat.id),
        name: Set("Inverter AC".into()),
        slug: Set(format!("inverter-ac-{suffix}")),
        description: Set("1.5 ton split".into()),
        price: Set(price),
        image_url: Set("https://cdn.example.com/ac.png".into()),
        stock: Set(stock),
        delivery_time_info: Set("3-5 days".into()),
        brand: Set(String::new()),
        model_number: Set(String::new()),
        weight: Set(None),
        dimensions: Set(String::new()),
        warranty_period: Set("1 Year".into()),
        features: Set(String::new()),
        meta_description: Set(String::new()),
        is_featured: Set(false),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?)
}

pub async fn make_service_category(db: &DatabaseConnection) -> anyhow::Result<(service_category::Model, service_issue::Model)> {
    let cat = service_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("AC Repair {}", Uuid::new_v4().simple())),
    }
    .insert(db)
    .await?;
    let issue = service_issue::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(cat.id),
        description: Set("Not cooling".into()),
        price: Set(Decimal::new(45000, 2)),
    }
    .insert(db)
    .await?;
    Ok((cat, issue))
}
