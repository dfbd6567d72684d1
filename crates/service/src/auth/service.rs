use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use models::{user as user_model, UserRole};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, GoogleProfile, LoginInput, NewAccount, RegisterInput, TokenKind};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::tokens::{self, TokenConfig};

const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub tokens: TokenConfig,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            tokens: TokenConfig { jwt_secret: jwt_secret.into(), access_ttl_minutes, refresh_ttl_days },
            password_algorithm: "argon2".into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_hash(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation("Password must be at least 8 characters long".into()));
    }
    Ok(())
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    pub fn token_config(&self) -> &TokenConfig { &self.cfg.tokens }

    /// Register a new customer with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 60, 7));
    /// let input = RegisterInput { email: "User@Example.com".into(), name: "Test".into(), password: "Secret123".into(), phone: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        self.create_account(NewAccount {
            email: input.email,
            name: input.name,
            password: Some(input.password),
            phone: input.phone,
            role: UserRole::Customer,
            is_staff: false,
        })
        .await
    }

    /// Create an account with any role; a `None` password leaves it social-login only.
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn create_account(&self, input: NewAccount) -> Result<AuthUser, AuthError> {
        user_model::validate_email(&input.email)?;
        user_model::validate_name(&input.name)?;
        if let Some(password) = input.password.as_deref() {
            validate_password(password)?;
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self
            .repo
            .create_user(&input.email, &input.name, input.phone, input.role, input.is_staff)
            .await?;
        if let Some(password) = input.password.as_deref() {
            let hash = hash_password(password)?;
            self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        }
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue an access/refresh token pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 60, 7));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), phone: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.tokens.access.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.is_active {
            warn!(user_id = %user.id, "login_inactive_account");
            return Err(AuthError::Unauthorized);
        }

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !verify_hash(&input.password, &cred.password_hash)? {
            return Err(AuthError::Unauthorized);
        }

        let tokens = tokens::issue_pair(&self.cfg.tokens, &user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, tokens })
    }

    /// Exchange a refresh token for a fresh pair.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let claims = tokens::verify(&self.cfg.tokens, refresh_token, TokenKind::Refresh)?;
        let user = self.repo.find_user_by_id(claims.uid).await?.ok_or(AuthError::Unauthorized)?;
        if !user.is_active {
            return Err(AuthError::Unauthorized);
        }
        let tokens = tokens::issue_pair(&self.cfg.tokens, &user)?;
        Ok(AuthSession { user, tokens })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        tokens::verify(&self.cfg.tokens, token, TokenKind::Access)
    }

    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(&self, user_id: Uuid, current: &str, new_password: &str) -> Result<(), AuthError> {
        if current.is_empty() || new_password.is_empty() {
            return Err(AuthError::Validation("Both current and new passwords are required".into()));
        }
        self.check_password(user_id, current, "Current password is incorrect").await?;
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation("New password must be at least 8 characters long".into()));
        }
        let hash = hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(%user_id, "password_changed");
        Ok(())
    }

    /// Deactivate the account after re-checking the password.
    #[instrument(skip(self, password))]
    pub async fn deactivate(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required to delete account".into()));
        }
        self.check_password(user_id, password, "Incorrect password").await?;
        self.repo.set_active(user_id, false).await?;
        info!(%user_id, "account_deactivated");
        Ok(())
    }

    /// Find or create the account behind a Google identity and start a session.
    #[instrument(skip(self, profile), fields(email = %profile.email))]
    pub async fn google_login(&self, profile: GoogleProfile) -> Result<AuthSession, AuthError> {
        if !profile.email_verified {
            return Err(AuthError::Validation("Google account email is not verified".into()));
        }
        user_model::validate_email(&profile.email)?;
        let display_name = profile
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| profile.email.split('@').next().unwrap_or_default().to_string());

        let user = match self.repo.find_user_by_email(&profile.email).await? {
            Some(existing) if existing.name != display_name && profile.name.is_some() => {
                self.repo.update_name(existing.id, &display_name).await?
            }
            Some(existing) => existing,
            None => {
                let created = self
                    .repo
                    .create_user(&profile.email, &display_name, None, UserRole::Customer, false)
                    .await?;
                info!(user_id = %created.id, "user_created_from_google");
                created
            }
        };
        if !user.is_active {
            return Err(AuthError::Inactive);
        }
        let tokens = tokens::issue_pair(&self.cfg.tokens, &user)?;
        Ok(AuthSession { user, tokens })
    }

    async fn check_password(&self, user_id: Uuid, password: &str, wrong_msg: &str) -> Result<(), AuthError> {
        let cred = self
            .repo
            .get_credentials(user_id)
            .await?
            .ok_or_else(|| AuthError::Validation("Account has no password set".into()))?;
        if !verify_hash(password, &cred.password_hash)? {
            return Err(AuthError::Validation(wrong_msg.to_string()));
        }
        Ok(())
    }
}
