//! Create `user` table.
//!
//! One row per account; `role` drives access (ADMIN, CUSTOMER, TECHNICIAN, AMC).
//! Deactivated accounts keep their row with `is_active = false`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).unique_key())
                    .col(string_len(User::Name, 255))
                    .col(string_len_null(User::Phone, 15))
                    .col(string_len(User::Role, 20).default("CUSTOMER"))
                    .col(boolean(User::IsActive).default(true))
                    .col(boolean(User::IsStaff).default(false))
                    .col(boolean(User::EmailNotifications).default(true))
                    .col(boolean(User::SmsNotifications).default(true))
                    .col(timestamp_with_time_zone(User::CreatedAt))
                    .col(timestamp_with_time_zone(User::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Email,
    Name,
    Phone,
    Role,
    IsActive,
    IsStaff,
    EmailNotifications,
    SmsNotifications,
    CreatedAt,
    UpdatedAt,
}
