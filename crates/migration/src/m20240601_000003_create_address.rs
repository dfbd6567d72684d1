//! Create `address` table; each user may keep several, one flagged default.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Address::Table)
                    .if_not_exists()
                    .col(uuid(Address::Id).primary_key())
                    .col(uuid(Address::UserId))
                    .col(string_len(Address::StreetAddress, 255))
                    .col(string_len(Address::City, 100))
                    .col(string_len(Address::State, 100))
                    .col(string_len(Address::Pincode, 6))
                    .col(boolean(Address::IsDefault).default(false))
                    .col(timestamp_with_time_zone(Address::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_user")
                            .from(Address::Table, Address::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Address::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Address { Table, Id, UserId, StreetAddress, City, State, Pincode, IsDefault, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
