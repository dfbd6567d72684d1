//! Create `job_sheet` (at most one per service request) and `job_sheet_material`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobSheet::Table)
                    .if_not_exists()
                    .col(uuid(JobSheet::Id).primary_key())
                    .col(uuid(JobSheet::ServiceRequestId).unique_key())
                    .col(string_len(JobSheet::CustomerName, 255))
                    .col(string_len(JobSheet::CustomerContact, 20))
                    .col(text(JobSheet::ServiceAddress))
                    .col(string_len(JobSheet::EquipmentType, 100))
                    .col(string_len(JobSheet::SerialNumber, 100).default(""))
                    .col(string_len(JobSheet::EquipmentBrand, 100).default(""))
                    .col(string_len(JobSheet::EquipmentModel, 100).default(""))
                    .col(text(JobSheet::ProblemDescription))
                    .col(text(JobSheet::WorkPerformed))
                    .col(date(JobSheet::DateOfService))
                    .col(time(JobSheet::StartTime))
                    .col(time(JobSheet::FinishTime))
                    .col(integer(JobSheet::TotalTimeMinutes).default(0))
                    .col(string_len(JobSheet::ApprovalStatus, 20).default("PENDING"))
                    .col(text_null(JobSheet::CustomerSignature))
                    .col(timestamp_with_time_zone_null(JobSheet::ApprovedAt))
                    .col(text_null(JobSheet::DeclinedReason))
                    .col(uuid_null(JobSheet::CreatedBy))
                    .col(timestamp_with_time_zone(JobSheet::CreatedAt))
                    .col(timestamp_with_time_zone(JobSheet::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_sheet_service_request")
                            .from(JobSheet::Table, JobSheet::ServiceRequestId)
                            .to(ServiceRequest::Table, ServiceRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_sheet_created_by")
                            .from(JobSheet::Table, JobSheet::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobSheetMaterial::Table)
                    .if_not_exists()
                    .col(uuid(JobSheetMaterial::Id).primary_key())
                    .col(uuid(JobSheetMaterial::JobSheetId))
                    .col(date(JobSheetMaterial::DateUsed))
                    .col(string_len(JobSheetMaterial::ItemDescription, 255))
                    .col(decimal_len(JobSheetMaterial::Quantity, 10, 2))
                    .col(decimal_len(JobSheetMaterial::UnitCost, 10, 2))
                    .col(decimal_len(JobSheetMaterial::TotalCost, 10, 2))
                    .col(timestamp_with_time_zone(JobSheetMaterial::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_sheet_material_job_sheet")
                            .from(JobSheetMaterial::Table, JobSheetMaterial::JobSheetId)
                            .to(JobSheet::Table, JobSheet::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(JobSheetMaterial::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(JobSheet::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum JobSheet {
    Table,
    Id,
    ServiceRequestId,
    CustomerName,
    CustomerContact,
    ServiceAddress,
    EquipmentType,
    SerialNumber,
    EquipmentBrand,
    EquipmentModel,
    ProblemDescription,
    WorkPerformed,
    DateOfService,
    StartTime,
    FinishTime,
    TotalTimeMinutes,
    ApprovalStatus,
    CustomerSignature,
    ApprovedAt,
    DeclinedReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobSheetMaterial {
    Table,
    Id,
    JobSheetId,
    DateUsed,
    ItemDescription,
    Quantity,
    UnitCost,
    TotalCost,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ServiceRequest { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
