//! Create `orders` and `order_item`.
//!
//! `order_item.price` is the product price captured when the order was placed.
//! `orders.stock_reserved` records whether confirmation took the items out of stock.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(uuid(Orders::Id).primary_key())
                    .col(uuid_null(Orders::CustomerId))
                    .col(uuid_null(Orders::TechnicianId))
                    .col(uuid_null(Orders::ShippingAddressId))
                    .col(string_len(Orders::Status, 20).default("PENDING"))
                    .col(boolean(Orders::StockReserved).default(false))
                    .col(timestamp_with_time_zone(Orders::OrderDate))
                    .col(timestamp_with_time_zone(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_technician")
                            .from(Orders::Table, Orders::TechnicianId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_shipping_address")
                            .from(Orders::Table, Orders::ShippingAddressId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItem::Table)
                    .if_not_exists()
                    .col(uuid(OrderItem::Id).primary_key())
                    .col(uuid(OrderItem::OrderId))
                    .col(uuid(OrderItem::ProductId))
                    .col(integer(OrderItem::Quantity).default(1))
                    .col(decimal_len(OrderItem::Price, 10, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_item_order")
                            .from(OrderItem::Table, OrderItem::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_item_product")
                            .from(OrderItem::Table, OrderItem::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderItem::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Orders { Table, Id, CustomerId, TechnicianId, ShippingAddressId, Status, StockReserved, OrderDate, UpdatedAt }

#[derive(DeriveIden)]
enum OrderItem { Table, Id, OrderId, ProductId, Quantity, Price }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Address { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
