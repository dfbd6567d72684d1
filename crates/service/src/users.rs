use chrono::Utc;
use models::{address, amc_free_category, service_category, user, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Public shape of an account; never carries credentials.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub email_notifications: bool,
    pub sms_notifications: bool,
}

impl From<user::Model> for UserView {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone: u.phone,
            role: u.role,
            email_notifications: u.email_notifications,
            sms_notifications: u.sms_notifications,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileCompleteness {
    pub is_complete: bool,
    pub missing_fields: Vec<&'static str>,
    pub user: UserView,
}

/// Row in the staff user listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_staff: bool,
    pub free_service_categories: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    /// Replaces the AMC free category set when present.
    pub free_service_categories: Option<Vec<Uuid>>,
}

pub async fn find_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))
}

pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<UserView, ServiceError> {
    Ok(find_user(db, user_id).await?.into())
}

/// Partial update of the caller's own profile. Email and role are not editable here.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: ProfileUpdate,
) -> Result<UserView, ServiceError> {
    let mut am: user::ActiveModel = find_user(db, user_id).await?.into();
    if let Some(name) = input.name {
        user::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(phone) = input.phone {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            am.phone = Set(None);
        } else {
            user::validate_phone(&phone)?;
            am.phone = Set(Some(phone));
        }
    }
    if let Some(flag) = input.email_notifications {
        am.email_notifications = Set(flag);
    }
    if let Some(flag) = input.sms_notifications {
        am.sms_notifications = Set(flag);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(user_id = %updated.id, "profile_updated");
    Ok(updated.into())
}

/// Checkout readiness: name, phone and at least one saved address.
pub async fn validate_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<ProfileCompleteness, ServiceError> {
    let user = find_user(db, user_id).await?;
    let address_count = address::Entity::find()
        .filter(address::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let missing_fields = missing_profile_fields(&user, address_count > 0);
    Ok(ProfileCompleteness { is_complete: missing_fields.is_empty(), missing_fields, user: user.into() })
}

pub fn missing_profile_fields(user: &user::Model, has_address: bool) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if user.name.trim().is_empty() {
        missing.push("name");
    }
    if user.phone.as_deref().map_or(true, |p| p.trim().is_empty()) {
        missing.push("phone");
    }
    if !has_address {
        missing.push("address");
    }
    missing
}

/// AMC customers get their designated categories without a fee.
pub async fn has_free_service(
    db: &DatabaseConnection,
    user: &user::Model,
    category_id: Uuid,
) -> Result<bool, ServiceError> {
    if user.role != UserRole::Amc {
        return Ok(false);
    }
    Ok(amc_free_category::category_ids_for_user(db, user.id).await?.contains(&category_id))
}

pub async fn list_users(db: &DatabaseConnection, role: Option<UserRole>) -> Result<Vec<AdminUserView>, ServiceError> {
    let mut query = user::Entity::find().order_by_desc(user::Column::CreatedAt);
    if let Some(role) = role {
        query = query.filter(user::Column::Role.eq(role));
    }
    let users = query.all(db).await?;
    let amc_ids: Vec<Uuid> = users.iter().filter(|u| u.role == UserRole::Amc).map(|u| u.id).collect();
    let mut free = amc_free_category::category_ids_by_user(db, &amc_ids).await?;
    Ok(users
        .into_iter()
        .map(|u| {
            let categories = free.remove(&u.id).unwrap_or_default();
            admin_view(u, categories)
        })
        .collect())
}

pub async fn get_user_admin(db: &DatabaseConnection, id: Uuid) -> Result<AdminUserView, ServiceError> {
    let u = find_user(db, id).await?;
    let free = amc_free_category::category_ids_for_user(db, id).await?;
    Ok(admin_view(u, free))
}

fn admin_view(u: user::Model, free_service_categories: Vec<Uuid>) -> AdminUserView {
    AdminUserView {
        id: u.id,
        email: u.email,
        name: u.name,
        phone: u.phone,
        role: u.role,
        is_active: u.is_active,
        is_staff: u.is_staff,
        free_service_categories,
        created_at: u.created_at,
    }
}

/// Staff edit of role, flags and AMC entitlements, applied in one transaction.
pub async fn update_user(
    db: &DatabaseConnection,
    id: Uuid,
    input: AdminUserUpdate,
) -> Result<AdminUserView, ServiceError> {
    let txn = db.begin().await?;
    let existing = user::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;
    let mut am: user::ActiveModel = existing.into();
    if let Some(name) = input.name {
        user::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(phone) = input.phone {
        if phone.trim().is_empty() {
            am.phone = Set(None);
        } else {
            user::validate_phone(phone.trim())?;
            am.phone = Set(Some(phone.trim().to_string()));
        }
    }
    if let Some(role) = input.role {
        am.role = Set(role);
    }
    if let Some(active) = input.is_active {
        am.is_active = Set(active);
    }
    if let Some(staff) = input.is_staff {
        am.is_staff = Set(staff);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;

    if let Some(categories) = input.free_service_categories {
        amc_free_category::Entity::delete_many()
            .filter(amc_free_category::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        for category_id in categories {
            service_category::Entity::find_by_id(category_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Service category"))?;
            amc_free_category::ActiveModel { user_id: Set(id), service_category_id: Set(category_id) }
                .insert(&txn)
                .await?;
        }
    }
    txn.commit().await?;
    info!(user_id = %id, role = %updated.role, is_active = updated.is_active, "user_updated_by_admin");
    get_user_admin(db, id).await
}

/// Staff removal of an account. Admin accounts and the caller's own account are kept.
pub async fn delete_user(db: &DatabaseConnection, actor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    if actor_id == id {
        return Err(ServiceError::validation("You cannot delete your own account"));
    }
    let target = find_user(db, id).await?;
    if target.role == UserRole::Admin {
        return Err(ServiceError::validation("Cannot delete admin account"));
    }
    target.delete(db).await?;
    info!(user_id = %id, %actor_id, "user_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_address, make_service_category, make_user, skip_db};

    fn bare_user(name: &str, phone: Option<&str>) -> user::Model {
        let now = Utc::now().into();
        user::Model {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            name: name.into(),
            phone: phone.map(str::to_string),
            role: UserRole::Customer,
            is_active: true,
            is_staff: false,
            email_notifications: true,
            sms_notifications: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_fields_lists_each_gap() {
        assert_eq!(missing_profile_fields(&bare_user(" ", None), false), vec!["name", "phone", "address"]);
        assert_eq!(missing_profile_fields(&bare_user("Asha", Some("  ")), true), vec!["phone"]);
        assert!(missing_profile_fields(&bare_user("Asha", Some("9876543210")), true).is_empty());
    }

    #[tokio::test]
    async fn profile_update_and_completeness() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let u = make_user(&db, UserRole::Customer).await?;

        let before = validate_profile(&db, u.id).await?;
        assert!(!before.is_complete);
        assert_eq!(before.missing_fields, vec!["address"]);

        make_address(&db, u.id, true).await?;
        let updated = update_profile(
            &db,
            u.id,
            ProfileUpdate { name: Some("Renamed".into()), sms_notifications: Some(false), ..Default::default() },
        )
        .await?;
        assert_eq!(updated.name, "Renamed");
        assert!(!updated.sms_notifications);
        assert!(validate_profile(&db, u.id).await?.is_complete);

        let bad = update_profile(&db, u.id, ProfileUpdate { phone: Some("12".into()), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Model(_))));
        Ok(())
    }

    #[tokio::test]
    async fn amc_free_categories_drive_has_free_service() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let amc = make_user(&db, UserRole::Amc).await?;
        let (cat, _) = make_service_category(&db).await?;
        assert!(!has_free_service(&db, &amc, cat.id).await?);

        let view = update_user(
            &db,
            amc.id,
            AdminUserUpdate { free_service_categories: Some(vec![cat.id]), ..Default::default() },
        )
        .await?;
        assert_eq!(view.free_service_categories, vec![cat.id]);
        assert!(has_free_service(&db, &amc, cat.id).await?);

        let customer = make_user(&db, UserRole::Customer).await?;
        assert!(!has_free_service(&db, &customer, cat.id).await?);

        let listed = list_users(&db, Some(UserRole::Amc)).await?;
        let row = listed.iter().find(|u| u.id == amc.id).map(|u| u.free_service_categories.clone());
        assert_eq!(row, Some(vec![cat.id]));

        let admin = make_user(&db, UserRole::Admin).await?;
        delete_user(&db, admin.id, amc.id).await?;
        assert!(matches!(find_user(&db, amc.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn admin_and_own_accounts_cannot_be_deleted() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let admin = make_user(&db, UserRole::Admin).await?;
        let other_admin = make_user(&db, UserRole::Admin).await?;

        let err = delete_user(&db, admin.id, other_admin.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete admin account");
        let err = delete_user(&db, admin.id, admin.id).await.unwrap_err();
        assert_eq!(err.to_string(), "You cannot delete your own account");
        assert!(find_user(&db, other_admin.id).await.is_ok());

        let missing = delete_user(&db, admin.id, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
