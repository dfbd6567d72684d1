use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::product_category;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub image_url: String,
    pub stock: i32,
    pub delivery_time_info: String,
    pub brand: String,
    pub model_number: String,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))", nullable)]
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub warranty_period: String,
    pub features: String,
    pub meta_description: String,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Comma separated `features` as a list; blanks dropped.
    pub fn features_list(&self) -> Vec<String> {
        self.features
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(product_category::Entity)
                .from(Column::CategoryId)
                .to(product_category::Column::Id)
                .into(),
        }
    }
}

impl Related<product_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_price(price: Decimal) -> Result<(), ModelError> {
    if price.is_sign_negative() {
        return Err(ModelError::Validation("Price cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_stock(stock: i32) -> Result<(), ModelError> {
    if stock < 0 {
        return Err(ModelError::Validation("Stock cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_meta_description(meta: &str) -> Result<(), ModelError> {
    if meta.chars().count() > 160 {
        return Err(ModelError::Validation("Meta description must be at most 160 characters".into()));
    }
    Ok(())
}
