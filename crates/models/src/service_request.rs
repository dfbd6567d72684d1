use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{address, service_category, service_issue, user};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Submitted => "SUBMITTED",
            ServiceStatus::Assigned => "ASSIGNED",
            ServiceStatus::InProgress => "IN_PROGRESS",
            ServiceStatus::Completed => "COMPLETED",
            ServiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUBMITTED" => Some(ServiceStatus::Submitted),
            "ASSIGNED" => Some(ServiceStatus::Assigned),
            "IN_PROGRESS" => Some(ServiceStatus::InProgress),
            "COMPLETED" => Some(ServiceStatus::Completed),
            "CANCELLED" => Some(ServiceStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub technician_id: Option<Uuid>,
    pub service_category_id: Uuid,
    pub issue_id: Option<Uuid>,
    pub custom_description: String,
    pub service_location_id: Option<Uuid>,
    pub status: ServiceStatus,
    pub request_date: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    /// Set when the customer confirms the request after payment.
    pub confirmed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Customer, Technician, Category, Issue, Location }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(user::Entity)
                .from(Column::CustomerId)
                .to(user::Column::Id)
                .into(),
            Relation::Technician => Entity::belongs_to(user::Entity)
                .from(Column::TechnicianId)
                .to(user::Column::Id)
                .into(),
            Relation::Category => Entity::belongs_to(service_category::Entity)
                .from(Column::ServiceCategoryId)
                .to(service_category::Column::Id)
                .into(),
            Relation::Issue => Entity::belongs_to(service_issue::Entity)
                .from(Column::IssueId)
                .to(service_issue::Column::Id)
                .into(),
            Relation::Location => Entity::belongs_to(address::Entity)
                .from(Column::ServiceLocationId)
                .to(address::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
