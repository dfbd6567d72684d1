use chrono::Utc;
use models::{user, user_credentials, UserRole};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl From<user::Model> for AuthUser {
    fn from(u: user::Model) -> Self {
        AuthUser { id: u.id, email: u.email, name: u.name, role: u.role, is_active: u.is_active, is_staff: u.is_staff }
    }
}

impl From<user_credentials::Model> for Credentials {
    fn from(c: user_credentials::Model) -> Self {
        Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, email: &str, name: &str, phone: Option<String>, role: UserRole, is_staff: bool) -> Result<AuthUser, AuthError> {
        let created = user::create(
            &self.db,
            user::NewUser { email: email.to_string(), name: name.to_string(), phone, role, is_staff },
        )
        .await?;
        Ok(created.into())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<AuthUser, AuthError> {
        let mut am: user::ActiveModel = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?
            .into();
        am.name = Set(name.to_string());
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(updated.into())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError> {
        user::set_active(&self.db, id, active).await?;
        Ok(())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(Credentials::from))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(c.into())
    }
}
