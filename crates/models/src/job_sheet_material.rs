use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job_sheet;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_sheet_material")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_sheet_id: Uuid,
    pub date_used: NaiveDate,
    pub item_description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_cost: Decimal,
    /// Always `quantity * unit_cost`; computed on insert.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_cost: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { JobSheet }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::JobSheet => Entity::belongs_to(job_sheet::Entity)
                .from(Column::JobSheetId)
                .to(job_sheet::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
