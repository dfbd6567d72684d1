use sea_orm::{entity::prelude::*, Set, ConnectionTrait, QueryFilter};
use sea_orm::sea_query::StringLen;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Account role; drives which endpoints a user may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "TECHNICIAN")]
    Technician,
    #[sea_orm(string_value = "AMC")]
    Amc,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Customer => "CUSTOMER",
            UserRole::Technician => "TECHNICIAN",
            UserRole::Amc => "AMC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "CUSTOMER" => Some(UserRole::Customer),
            "TECHNICIAN" => Some(UserRole::Technician),
            "AMC" => Some(UserRole::Amc),
            _ => None,
        }
    }

    /// Roles that place orders and raise service requests.
    pub fn is_customer_like(&self) -> bool {
        matches!(self, UserRole::Customer | UserRole::Amc)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_staff: bool,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Staff flag or ADMIN role grants access to the admin surface.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.role == UserRole::Admin
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Fields for a new account row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_staff: bool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid || email.len() > 255 || email.contains(char::is_whitespace) {
        return Err(ModelError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("Name is required".into()));
    }
    if name.len() > 255 {
        return Err(ModelError::Validation("Name is too long".into()));
    }
    Ok(())
}

/// Accepts 10 to 15 digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("Enter a valid phone number".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, ModelError> {
    validate_email(&input.email)?;
    validate_name(&input.name)?;
    if let Some(phone) = input.phone.as_deref() {
        validate_phone(phone)?;
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&input.email)),
        name: Set(input.name.trim().to_string()),
        phone: Set(input.phone),
        role: Set(input.role),
        is_active: Set(true),
        is_staff: Set(input.is_staff),
        email_notifications: Set(true),
        sms_notifications: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    found.is_active = Set(active);
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("x@nodot").is_err());
        assert!(validate_email("sp ace@b.co").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+919876543210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98765-43210").is_err());
    }

    #[test]
    fn role_parse_round_trips_display() {
        for role in [UserRole::Admin, UserRole::Customer, UserRole::Technician, UserRole::Amc] {
            assert_eq!(UserRole::parse(&role.to_string()), Some(role));
        }
        assert_eq!(UserRole::parse("technician"), Some(UserRole::Technician));
        assert_eq!(UserRole::parse("owner"), None);
    }
}
