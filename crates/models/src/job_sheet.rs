use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{service_request, user};

/// Customer sign-off state of a job sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "DECLINED")]
    Declined,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Declined => "DECLINED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(ApprovalStatus::Pending),
            "APPROVED" => Some(ApprovalStatus::Approved),
            "DECLINED" => Some(ApprovalStatus::Declined),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_sheet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub service_request_id: Uuid,
    pub customer_name: String,
    pub customer_contact: String,
    pub service_address: String,
    pub equipment_type: String,
    pub serial_number: String,
    pub equipment_brand: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub work_performed: String,
    pub date_of_service: NaiveDate,
    pub start_time: NaiveTime,
    pub finish_time: NaiveTime,
    pub total_time_minutes: i32,
    pub approval_status: ApprovalStatus,
    pub customer_signature: Option<String>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub declined_reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// `total_time_minutes` rendered as e.g. `2h 15m`.
    pub fn total_time_display(&self) -> String {
        let h = self.total_time_minutes / 60;
        let m = self.total_time_minutes % 60;
        if h > 0 { format!("{h}h {m}m") } else { format!("{m}m") }
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceRequest, CreatedBy }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceRequest => Entity::belongs_to(service_request::Entity)
                .from(Column::ServiceRequestId)
                .to(service_request::Column::Id)
                .into(),
            Relation::CreatedBy => Entity::belongs_to(user::Entity)
                .from(Column::CreatedBy)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
