//! Create `service_category`, `service_issue` and the `amc_free_category`
//! join table listing categories an AMC customer gets for free.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceCategory::Table)
                    .if_not_exists()
                    .col(uuid(ServiceCategory::Id).primary_key())
                    .col(string_len(ServiceCategory::Name, 100).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceIssue::Table)
                    .if_not_exists()
                    .col(uuid(ServiceIssue::Id).primary_key())
                    .col(uuid(ServiceIssue::CategoryId))
                    .col(string_len(ServiceIssue::Description, 255))
                    .col(decimal_len(ServiceIssue::Price, 10, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_issue_category")
                            .from(ServiceIssue::Table, ServiceIssue::CategoryId)
                            .to(ServiceCategory::Table, ServiceCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AmcFreeCategory::Table)
                    .if_not_exists()
                    .col(uuid(AmcFreeCategory::UserId))
                    .col(uuid(AmcFreeCategory::ServiceCategoryId))
                    .primary_key(
                        Index::create()
                            .col(AmcFreeCategory::UserId)
                            .col(AmcFreeCategory::ServiceCategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_amc_free_category_user")
                            .from(AmcFreeCategory::Table, AmcFreeCategory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_amc_free_category_category")
                            .from(AmcFreeCategory::Table, AmcFreeCategory::ServiceCategoryId)
                            .to(ServiceCategory::Table, ServiceCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AmcFreeCategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ServiceIssue::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ServiceCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceCategory { Table, Id, Name }

#[derive(DeriveIden)]
enum ServiceIssue { Table, Id, CategoryId, Description, Price }

#[derive(DeriveIden)]
enum AmcFreeCategory { Table, UserId, ServiceCategoryId }

#[derive(DeriveIden)]
enum User { Table, Id }
