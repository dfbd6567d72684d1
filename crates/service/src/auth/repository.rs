use async_trait::async_trait;
use models::UserRole;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, phone: Option<String>, role: UserRole, is_staff: bool) -> Result<AuthUser, AuthError>;
    async fn update_name(&self, id: Uuid, name: &str) -> Result<AuthUser, AuthError>;
    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: lower-cased email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        fn with_user<T>(&self, id: Uuid, f: impl FnOnce(&mut AuthUser) -> T) -> Result<T, AuthError> {
            let mut users = self.users.lock().unwrap();
            users.values_mut().find(|u| u.id == id).map(f).ok_or(AuthError::NotFound)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&email.trim().to_lowercase()).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, _phone: Option<String>, role: UserRole, is_staff: bool) -> Result<AuthUser, AuthError> {
            let key = email.trim().to_lowercase();
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: key.clone(), name: name.to_string(), role, is_active: true, is_staff };
            users.insert(key, user.clone());
            Ok(user)
        }

        async fn update_name(&self, id: Uuid, name: &str) -> Result<AuthUser, AuthError> {
            self.with_user(id, |u| {
                u.name = name.to_string();
                u.clone()
            })
        }

        async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError> {
            self.with_user(id, |u| u.is_active = active)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
