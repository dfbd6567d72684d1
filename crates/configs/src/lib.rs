use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:5173";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// JWT and social-login settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
    #[serde(default)]
    pub frontend_base_url: String,
    /// Set the `Secure` flag on the `auth_token` cookie.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Shared with the OAuth relay that performs the Google code exchange.
    /// Empty disables `/auth/google/callback`.
    #[serde(default)]
    pub google_callback_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            frontend_base_url: String::new(),
            secure_cookies: false,
            google_callback_secret: String::new(),
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_access_ttl() -> i64 { 60 }
fn default_refresh_ttl() -> i64 { 7 }

impl DatabaseConfig {
    fn with_defaults() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Defaults for every section; env-backed values are filled in by `normalize_and_validate`.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::with_defaults(),
            auth: AuthConfig::default(),
        }
    }

    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like `load_and_validate`, but a missing config file falls back to env vars.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_else(|_| Self::from_env());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // URL from TOML wins; DATABASE_URL fills the gap
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if self.frontend_base_url.trim().is_empty() {
            self.frontend_base_url = std::env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_BASE_URL.to_string());
        }
        if self.google_callback_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("GOOGLE_CALLBACK_SECRET") {
                self.google_callback_secret = secret;
            }
        }
        while self.frontend_base_url.ends_with('/') {
            self.frontend_base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.access_ttl_minutes <= 0 {
            return Err(anyhow!("auth.access_ttl_minutes must be positive"));
        }
        if self.refresh_ttl_days <= 0 {
            return Err(anyhow!("auth.refresh_ttl_days must be positive"));
        }
        let lower = self.frontend_base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("auth.frontend_base_url must be an http(s) URL"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
url = "postgres://u:p@localhost:5432/techverse"
max_connections = 5
min_connections = 1

[auth]
jwt_secret = "s3cret"
frontend_base_url = "https://shop.example.com/"
"#;

    #[test]
    fn parses_and_normalizes_sample() {
        let mut cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.auth.access_ttl_minutes, 60);
        assert_eq!(cfg.auth.refresh_ttl_days, 7);
        assert_eq!(cfg.auth.frontend_base_url, "https://shop.example.com");
    }

    #[test]
    fn google_relay_secret_comes_from_file() {
        let src = format!("{SAMPLE}google_callback_secret = \"relay-key\"\n");
        let mut cfg: AppConfig = toml::from_str(&src).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.auth.google_callback_secret, "relay-key");
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut db = DatabaseConfig::with_defaults();
        db.url = "mysql://localhost/x".into();
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_zero_token_lifetime() {
        let auth = AuthConfig {
            jwt_secret: "x".into(),
            access_ttl_minutes: 0,
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.into(),
            ..AuthConfig::default()
        };
        assert!(auth.validate().is_err());
    }

    #[test]
    fn rejects_pool_bounds_inverted() {
        let mut db = DatabaseConfig::with_defaults();
        db.url = "postgres://localhost/x".into();
        db.min_connections = 5;
        db.max_connections = 2;
        assert!(db.validate().is_err());
    }
}
