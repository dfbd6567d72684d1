use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: &[&str] = &[
    "idx_address_user",
    "idx_product_category",
    "uniq_product_spec_name",
    "idx_orders_customer",
    "idx_orders_technician",
    "idx_order_item_order",
    "idx_service_request_customer",
    "idx_service_request_technician",
    "idx_rating_technician",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_address_user")
                    .table(Address::Table)
                    .col(Address::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::CategoryId)
                    .to_owned(),
            )
            .await?;

        // One value per spec name per product
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_spec_name")
                    .table(ProductSpecification::Table)
                    .col(ProductSpecification::ProductId)
                    .col(ProductSpecification::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_technician")
                    .table(Orders::Table)
                    .col(Orders::TechnicianId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_item_order")
                    .table(OrderItem::Table)
                    .col(OrderItem::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_customer")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_technician")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::TechnicianId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_technician")
                    .table(TechnicianRating::Table)
                    .col(TechnicianRating::TechnicianId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in INDEXES {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Address { Table, UserId }

#[derive(DeriveIden)]
enum Product { Table, CategoryId }

#[derive(DeriveIden)]
enum ProductSpecification { Table, ProductId, Name }

#[derive(DeriveIden)]
enum Orders { Table, CustomerId, TechnicianId }

#[derive(DeriveIden)]
enum OrderItem { Table, OrderId }

#[derive(DeriveIden)]
enum ServiceRequest { Table, CustomerId, TechnicianId }

#[derive(DeriveIden)]
enum TechnicianRating { Table, TechnicianId }
