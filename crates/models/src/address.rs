use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Single-line form used on job sheets and order views.
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} - {}", self.street_address, self.city, self.state, self.pincode)
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_pincode(pincode: &str) -> Result<(), ModelError> {
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("Pincode must be exactly 6 digits".into()));
    }
    Ok(())
}

pub fn validate_fields(street: &str, city: &str, state: &str, pincode: &str) -> Result<(), ModelError> {
    for (label, value) in [("street_address", street), ("city", city), ("state", state)] {
        if value.trim().is_empty() {
            return Err(ModelError::Validation(format!("{label} is required")));
        }
    }
    validate_pincode(pincode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pincode_must_be_six_digits() {
        assert!(validate_pincode("560001").is_ok());
        assert!(validate_pincode("56001").is_err());
        assert!(validate_pincode("5600a1").is_err());
    }

    #[test]
    fn blank_city_rejected() {
        let err = validate_fields("1 Main St", " ", "KA", "560001").unwrap_err();
        assert_eq!(err.to_string(), "city is required");
    }
}
