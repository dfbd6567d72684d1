//! Create the product catalog: `product_category`, `product`, `product_image`
//! and `product_specification`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductCategory::Table)
                    .if_not_exists()
                    .col(uuid(ProductCategory::Id).primary_key())
                    .col(string_len(ProductCategory::Name, 100).unique_key())
                    .col(string_len(ProductCategory::Slug, 100).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid(Product::CategoryId))
                    .col(string_len(Product::Name, 200))
                    .col(string_len(Product::Slug, 200).unique_key())
                    .col(text(Product::Description))
                    .col(decimal_len(Product::Price, 10, 2))
                    .col(string_len(Product::ImageUrl, 500).default(""))
                    .col(integer(Product::Stock).default(0))
                    .col(string_len(Product::DeliveryTimeInfo, 100).default(""))
                    .col(string_len(Product::Brand, 100).default(""))
                    .col(string_len(Product::ModelNumber, 100).default(""))
                    .col(decimal_len_null(Product::Weight, 8, 2))
                    .col(string_len(Product::Dimensions, 100).default(""))
                    .col(string_len(Product::WarrantyPeriod, 50).default("1 Year"))
                    .col(text(Product::Features).default(""))
                    .col(string_len(Product::MetaDescription, 160).default(""))
                    .col(boolean(Product::IsFeatured).default(false))
                    .col(boolean(Product::IsActive).default(true))
                    .col(timestamp_with_time_zone(Product::CreatedAt))
                    .col(timestamp_with_time_zone(Product::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryId)
                            .to(ProductCategory::Table, ProductCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductImage::Table)
                    .if_not_exists()
                    .col(uuid(ProductImage::Id).primary_key())
                    .col(uuid(ProductImage::ProductId))
                    .col(string_len(ProductImage::ImageUrl, 500))
                    .col(string_len(ProductImage::AltText, 200).default(""))
                    .col(boolean(ProductImage::IsPrimary).default(false))
                    .col(integer(ProductImage::SortOrder).default(0))
                    .col(timestamp_with_time_zone(ProductImage::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_image_product")
                            .from(ProductImage::Table, ProductImage::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductSpecification::Table)
                    .if_not_exists()
                    .col(uuid(ProductSpecification::Id).primary_key())
                    .col(uuid(ProductSpecification::ProductId))
                    .col(string_len(ProductSpecification::Name, 100))
                    .col(string_len(ProductSpecification::Value, 200))
                    .col(integer(ProductSpecification::SortOrder).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_spec_product")
                            .from(ProductSpecification::Table, ProductSpecification::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductSpecification::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(ProductImage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ProductCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductCategory { Table, Id, Name, Slug }

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    CategoryId,
    Name,
    Slug,
    Description,
    Price,
    ImageUrl,
    Stock,
    DeliveryTimeInfo,
    Brand,
    ModelNumber,
    Weight,
    Dimensions,
    WarrantyPeriod,
    Features,
    MetaDescription,
    IsFeatured,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductImage { Table, Id, ProductId, ImageUrl, AltText, IsPrimary, SortOrder, CreatedAt }

#[derive(DeriveIden)]
enum ProductSpecification { Table, Id, ProductId, Name, Value, SortOrder }
