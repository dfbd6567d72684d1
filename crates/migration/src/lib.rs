//! Migrator registering entity-specific migrations in dependency order.
//! Indexes follow the table migrations; later column changes come after them.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_user;
mod m20240601_000002_create_user_credentials;
mod m20240601_000003_create_address;
mod m20240601_000004_create_catalog;
mod m20240601_000005_create_orders;
mod m20240601_000006_create_service_catalog;
mod m20240601_000007_create_service_request;
mod m20240601_000008_create_job_sheet;
mod m20240601_000009_create_technician_rating;
mod m20240601_000010_add_indexes;
mod m20240601_000011_add_service_request_confirmed_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_user::Migration),
            Box::new(m20240601_000002_create_user_credentials::Migration),
            Box::new(m20240601_000003_create_address::Migration),
            Box::new(m20240601_000004_create_catalog::Migration),
            Box::new(m20240601_000005_create_orders::Migration),
            Box::new(m20240601_000006_create_service_catalog::Migration),
            Box::new(m20240601_000007_create_service_request::Migration),
            Box::new(m20240601_000008_create_job_sheet::Migration),
            Box::new(m20240601_000009_create_technician_rating::Migration),
            Box::new(m20240601_000010_add_indexes::Migration),
            Box::new(m20240601_000011_add_service_request_confirmed_at::Migration),
        ]
    }
}
