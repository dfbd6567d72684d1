use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};

use models::user;
use service::auth::domain::{AuthSession, AuthUser, GoogleProfile, LoginInput, RegisterInput, TokenKind};
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::auth::tokens;

use crate::errors::JsonApiError;
use crate::observability::AUTH_FAILURES_TOTAL;

pub const AUTH_COOKIE: &str = "auth_token";
pub const GOOGLE_CALLBACK_SECRET_HEADER: &str = "x-google-callback-secret";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub frontend_base_url: String,
    pub secure_cookies: bool,
    pub google_callback_secret: String,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &configs::AuthConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let auth = AuthService::new(
            repo,
            AuthConfig::new(cfg.jwt_secret.clone(), cfg.access_ttl_minutes, cfg.refresh_ttl_days),
        );
        Self {
            db,
            auth: Arc::new(auth),
            frontend_base_url: cfg.frontend_base_url.clone(),
            secure_cookies: cfg.secure_cookies,
            google_callback_secret: cfg.google_callback_secret.clone(),
        }
    }
}

/// The authenticated account, inserted by [`require_user`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

#[derive(Serialize)]
pub struct SessionOutput {
    pub user: AuthUser,
    pub access: String,
    pub refresh: String,
    pub expires_in: i64,
}

impl From<AuthSession> for SessionOutput {
    fn from(s: AuthSession) -> Self {
        Self { user: s.user, access: s.tokens.access, refresh: s.tokens.refresh, expires_in: s.tokens.expires_in }
    }
}

#[derive(Deserialize)]
pub struct RefreshInput {
    pub refresh: String,
}

fn session_cookie(state: &ServerState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.secure_cookies);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn count_failure(e: AuthError) -> AuthError {
    if matches!(e, AuthError::Unauthorized | AuthError::Inactive) {
        AUTH_FAILURES_TOTAL.inc();
    }
    e
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let created = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<SessionOutput>), JsonApiError> {
    let session = state.auth.login(input).await.map_err(count_failure)?;
    let jar = jar.add(session_cookie(&state, session.tokens.access.clone()));
    Ok((jar, Json(session.into())))
}

pub async fn refresh(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<RefreshInput>,
) -> Result<(CookieJar, Json<SessionOutput>), JsonApiError> {
    let session = state.auth.refresh(&input.refresh).await.map_err(count_failure)?;
    let jar = jar.add(session_cookie(&state, session.tokens.access.clone()));
    Ok((jar, Json(session.into())))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<common::types::Message>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(common::types::Message::new("Successfully logged out")))
}

fn same_secret(expected: &str, given: &[u8]) -> bool {
    let expected = expected.as_bytes();
    expected.len() == given.len() && expected.iter().zip(given).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Only the OAuth relay holding the shared secret may assert a Google identity.
fn callback_authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    if state.google_callback_secret.is_empty() {
        return false;
    }
    headers
        .get(GOOGLE_CALLBACK_SECRET_HEADER)
        .is_some_and(|v| same_secret(&state.google_callback_secret, v.as_bytes()))
}

/// Receives the identity verified by the OAuth relay and sends the browser back
/// to the frontend with fresh tokens, or to the login page with an error code.
pub async fn google_callback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(profile): Json<GoogleProfile>,
) -> Redirect {
    if !callback_authorized(&state, &headers) {
        AUTH_FAILURES_TOTAL.inc();
        tracing::warn!(email = %profile.email, "google callback without relay secret");
        return Redirect::to(&tokens::google_error_redirect(&state.frontend_base_url, "not_authenticated"));
    }
    match state.auth.google_login(profile).await {
        Ok(session) => match tokens::google_success_redirect(&state.frontend_base_url, &session) {
            Ok(url) => Redirect::to(&url),
            Err(_) => Redirect::to(&tokens::google_error_redirect(&state.frontend_base_url, "token_generation_failed")),
        },
        Err(e) => {
            tracing::warn!(error = %e, "google login rejected");
            let code = match count_failure(e) {
                AuthError::Inactive => "account_disabled",
                _ => "not_authenticated",
            };
            Redirect::to(&tokens::google_error_redirect(&state.frontend_base_url, code))
        }
    }
}

/// Bearer header first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(h) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    }
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

async fn resolve_user(state: &ServerState, token: &str) -> Result<user::Model, JsonApiError> {
    let claims = tokens::verify(state.auth.token_config(), token, TokenKind::Access).map_err(|_| {
        AUTH_FAILURES_TOTAL.inc();
        JsonApiError::unauthorized("Invalid or expired token")
    })?;
    match user::Entity::find_by_id(claims.uid).one(&state.db).await {
        Ok(Some(u)) if u.is_active => Ok(u),
        Ok(_) => Err(JsonApiError::unauthorized("User not found or inactive")),
        Err(e) => Err(service::errors::ServiceError::from(e).into()),
    }
}

/// Resolves the caller when a valid token is present; anonymous otherwise.
pub async fn optional_user(state: &ServerState, headers: &HeaderMap) -> Option<user::Model> {
    let token = extract_token(headers)?;
    resolve_user(state, &token).await.ok()
}

pub async fn require_user(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let Some(token) = extract_token(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("Authentication credentials were not provided"));
    };
    let user = resolve_user(&state, &token).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Runs after [`require_user`]; rejects accounts without `is_staff`.
pub async fn require_staff(Extension(CurrentUser(user)): Extension<CurrentUser>, req: Request, next: Next) -> Response {
    if !user.is_staff {
        tracing::warn!(user_id = %user.id, path = %req.uri().path(), "staff route denied");
        return JsonApiError::forbidden("Staff access required").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=tok123"));
        assert_eq!(extract_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn relay_secret_must_match_exactly() {
        assert!(same_secret("relay-key", b"relay-key"));
        assert!(!same_secret("relay-key", b"relay-kex"));
        assert!(!same_secret("relay-key", b"relay-key2"));
        assert!(!same_secret("relay-key", b""));
    }

    #[test]
    fn malformed_header_yields_nothing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(extract_token(&headers).is_none());
        assert!(extract_token(&HeaderMap::new()).is_none());
    }
}
