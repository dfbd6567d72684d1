//! Create `technician_rating`. A rating targets exactly one order or one
//! service request; the unique keys keep it to one rating per job.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TechnicianRating::Table)
                    .if_not_exists()
                    .col(uuid(TechnicianRating::Id).primary_key())
                    .col(uuid(TechnicianRating::TechnicianId))
                    .col(uuid(TechnicianRating::CustomerId))
                    .col(uuid_null(TechnicianRating::OrderId).unique_key())
                    .col(uuid_null(TechnicianRating::ServiceRequestId).unique_key())
                    .col(small_integer(TechnicianRating::Rating))
                    .col(text(TechnicianRating::Comment).default(""))
                    .col(timestamp_with_time_zone(TechnicianRating::CreatedAt))
                    .check(
                        Expr::col(TechnicianRating::Rating)
                            .gte(1)
                            .and(Expr::col(TechnicianRating::Rating).lte(5)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_technician")
                            .from(TechnicianRating::Table, TechnicianRating::TechnicianId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_customer")
                            .from(TechnicianRating::Table, TechnicianRating::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_order")
                            .from(TechnicianRating::Table, TechnicianRating::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_service_request")
                            .from(TechnicianRating::Table, TechnicianRating::ServiceRequestId)
                            .to(ServiceRequest::Table, ServiceRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TechnicianRating::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TechnicianRating {
    Table,
    Id,
    TechnicianId,
    CustomerId,
    OrderId,
    ServiceRequestId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Orders { Table, Id }

#[derive(DeriveIden)]
enum ServiceRequest { Table, Id }
