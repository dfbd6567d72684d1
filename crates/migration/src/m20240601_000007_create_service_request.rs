//! Create `service_request`: a customer's ticket against a service category.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequest::Table)
                    .if_not_exists()
                    .col(uuid(ServiceRequest::Id).primary_key())
                    .col(uuid(ServiceRequest::CustomerId))
                    .col(uuid_null(ServiceRequest::TechnicianId))
                    .col(uuid(ServiceRequest::ServiceCategoryId))
                    .col(uuid_null(ServiceRequest::IssueId))
                    .col(text(ServiceRequest::CustomDescription).default(""))
                    .col(uuid_null(ServiceRequest::ServiceLocationId))
                    .col(string_len(ServiceRequest::Status, 20).default("SUBMITTED"))
                    .col(timestamp_with_time_zone(ServiceRequest::RequestDate))
                    .col(timestamp_with_time_zone(ServiceRequest::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_customer")
                            .from(ServiceRequest::Table, ServiceRequest::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_technician")
                            .from(ServiceRequest::Table, ServiceRequest::TechnicianId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_category")
                            .from(ServiceRequest::Table, ServiceRequest::ServiceCategoryId)
                            .to(ServiceCategory::Table, ServiceCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_issue")
                            .from(ServiceRequest::Table, ServiceRequest::IssueId)
                            .to(ServiceIssue::Table, ServiceIssue::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_location")
                            .from(ServiceRequest::Table, ServiceRequest::ServiceLocationId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceRequest {
    Table,
    Id,
    CustomerId,
    TechnicianId,
    ServiceCategoryId,
    IssueId,
    CustomDescription,
    ServiceLocationId,
    Status,
    RequestDate,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum ServiceCategory { Table, Id }

#[derive(DeriveIden)]
enum ServiceIssue { Table, Id }

#[derive(DeriveIden)]
enum Address { Table, Id }
