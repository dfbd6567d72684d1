//! HS256 access/refresh tokens and the Google login redirect URLs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use url::Url;

use super::domain::{AuthSession, AuthUser, Claims, TokenKind, TokenPair};
use super::errors::AuthError;

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl TokenConfig {
    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.access_ttl_minutes),
            TokenKind::Refresh => Duration::days(self.refresh_ttl_days),
        }
    }
}

pub fn issue(cfg: &TokenConfig, user: &AuthUser, kind: TokenKind) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        uid: user.id,
        role: user.role,
        kind,
        iat: now.timestamp() as usize,
        exp: (now + cfg.ttl(kind)).timestamp() as usize,
    };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

pub fn issue_pair(cfg: &TokenConfig, user: &AuthUser) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: issue(cfg, user, TokenKind::Access)?,
        refresh: issue(cfg, user, TokenKind::Refresh)?,
        expires_in: cfg.access_ttl_minutes * 60,
    })
}

/// Validate signature, expiry and token kind.
pub fn verify(cfg: &TokenConfig, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(cfg.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation).map_err(|_| AuthError::Unauthorized)?;
    if data.claims.kind != expected {
        return Err(AuthError::Unauthorized);
    }
    Ok(data.claims)
}

/// `{frontend}/?login=success&access=..&refresh=..&email=..`
pub fn google_success_redirect(frontend_base_url: &str, session: &AuthSession) -> Result<String, AuthError> {
    let base = Url::parse(&format!("{}/", frontend_base_url.trim_end_matches('/')))
        .map_err(|e| AuthError::Validation(format!("invalid frontend url: {e}")))?;
    let url = Url::parse_with_params(
        base.as_str(),
        &[
            ("login", "success"),
            ("access", session.tokens.access.as_str()),
            ("refresh", session.tokens.refresh.as_str()),
            ("email", session.user.email.as_str()),
        ],
    )
    .map_err(|e| AuthError::Validation(format!("invalid frontend url: {e}")))?;
    Ok(url.to_string())
}

/// `{frontend}/login?error=<code>`; falls back to plain concatenation on a bad base URL.
pub fn google_error_redirect(frontend_base_url: &str, code: &str) -> String {
    let base = format!("{}/login", frontend_base_url.trim_end_matches('/'));
    match Url::parse_with_params(&base, &[("error", code)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{base}?error={code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::UserRole;
    use uuid::Uuid;

    fn cfg() -> TokenConfig {
        TokenConfig { jwt_secret: "unit-secret".into(), access_ttl_minutes: 60, refresh_ttl_days: 7 }
    }

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "tech+1@example.com".into(), name: "T".into(), role: UserRole::Technician, is_active: true, is_staff: false }
    }

    #[test]
    fn access_token_round_trip_and_kind_check() {
        let u = user();
        let pair = issue_pair(&cfg(), &u).unwrap();
        let claims = verify(&cfg(), &pair.access, TokenKind::Access).unwrap();
        assert_eq!(claims.uid, u.id);
        assert_eq!(claims.role, UserRole::Technician);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(matches!(verify(&cfg(), &pair.access, TokenKind::Refresh), Err(AuthError::Unauthorized)));
        assert!(verify(&cfg(), &pair.refresh, TokenKind::Refresh).is_ok());
        assert_eq!(pair.expires_in, 3600);
    }

    #[test]
    fn wrong_secret_rejected() {
        let pair = issue_pair(&cfg(), &user()).unwrap();
        let other = TokenConfig { jwt_secret: "other".into(), ..cfg() };
        assert!(verify(&other, &pair.access, TokenKind::Access).is_err());
    }

    #[test]
    fn google_redirects_are_encoded() {
        let u = user();
        let session = AuthSession { tokens: issue_pair(&cfg(), &u).unwrap(), user: u };
        let url = google_success_redirect("http://localhost:5173/", &session).unwrap();
        assert!(url.starts_with("http://localhost:5173/?login=success&access="));
        assert!(url.ends_with("&email=tech%2B1%40example.com"));

        assert_eq!(
            google_error_redirect("http://localhost:5173", "not_authenticated"),
            "http://localhost:5173/login?error=not_authenticated"
        );
    }
}
