/*!
 * # Admin Authentication
 *
 * Every `/api/admin` route sits behind [`admin_middleware`]:
 *
 * - the `Authorization: Bearer <JWT>` header is verified (HS256, `exp` checked);
 * - the token subject is resolved to a row of the `users` table;
 * - only users flagged `is_admin` get through.
 *
 * Every failure is rejected with 403 and the same message, whether the
 * token is missing, unusable, or names a user who is unknown or not an
 * administrator. Tokens are issued elsewhere; this module only verifies them.
 */

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::user;
use crate::errors::ServiceError;

/// Claims read from admin bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id. Issuers encode it either as a string or as a number.
    #[serde(deserialize_with = "deserialize_subject")]
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

fn deserialize_subject<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Text(String),
        Number(i64),
    }

    match Subject::deserialize(deserializer) {
        Ok(Subject::Text(s)) => Ok(s),
        Ok(Subject::Number(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom("sub must be a string or an integer")),
    }
}

/// Identity of the administrator making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub user_id: i32,
    pub email: String,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            leeway_secs: 0,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

/// Verifies bearer tokens and resolves them to administrators.
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Validates `token` and loads its subject, requiring the admin flag.
    pub async fn resolve_admin(&self, token: &str) -> Result<AdminUser, AuthError> {
        let claims = self.validate_token(token)?;

        let user_id: i32 = claims.sub.trim().parse().map_err(|_| {
            debug!(sub = %claims.sub, "token subject is not a user id");
            AuthError::UnknownUser
        })?;

        let user = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !user.is_admin {
            return Err(AuthError::NotAdmin);
        }

        Ok(AdminUser {
            user_id: user.id,
            email: user.email,
        })
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token subject does not match any user")]
    UnknownUser,

    #[error("User is not an administrator")]
    NotAdmin,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Extracts the token of an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Rejects the request unless it carries an administrator's bearer token.
/// On success the [`AdminUser`] is placed in the request extensions.
pub async fn admin_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;

    let admin = auth.resolve_admin(token).await.map_err(|err| {
        match &err {
            AuthError::Database(_) => {}
            other => warn!(
                reason = %other,
                method = %request.method(),
                path = %request.uri().path(),
                "admin access denied"
            ),
        }
        ServiceError::from(err)
    })?;

    debug!(user_id = admin.user_id, "admin authenticated");
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_admin(self, auth: Arc<AuthService>) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_admin(self, auth: Arc<AuthService>) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(auth, admin_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "auth-unit-test-secret-0123456789abcdef";

    fn service() -> AuthService {
        service_with(AuthConfig::new(SECRET))
    }

    fn service_with(config: AuthConfig) -> AuthService {
        AuthService::new(config, Arc::new(DatabaseConnection::Disconnected))
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   abc.def ")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn accepts_string_and_numeric_subjects() {
        let exp = Utc::now().timestamp() + 600;
        let svc = service();

        let claims = svc
            .validate_token(&token(json!({ "sub": "7", "exp": exp }), SECRET))
            .unwrap();
        assert_eq!(claims.sub, "7");

        let claims = svc
            .validate_token(&token(json!({ "sub": 12, "exp": exp }), SECRET))
            .unwrap();
        assert_eq!(claims.sub, "12");
    }

    #[test]
    fn rejects_expired_tokens() {
        let exp = Utc::now().timestamp() - 3600;
        let result = service().validate_token(&token(json!({ "sub": "1", "exp": exp }), SECRET));
        assert_matches!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn leeway_tolerates_small_clock_skew() {
        let exp = Utc::now().timestamp() - 30;
        let expired = token(json!({ "sub": "1", "exp": exp }), SECRET);

        assert_matches!(service().validate_token(&expired), Err(AuthError::TokenExpired));

        let lenient = service_with(AuthConfig::new(SECRET).with_leeway(120));
        assert_eq!(lenient.validate_token(&expired).unwrap().sub, "1");
    }

    #[test]
    fn rejects_foreign_signatures_and_garbage() {
        let exp = Utc::now().timestamp() + 600;
        let forged = token(
            json!({ "sub": "1", "exp": exp }),
            "another-secret-entirely-0123456789abcdef",
        );
        assert_matches!(service().validate_token(&forged), Err(AuthError::InvalidToken));
        assert_matches!(service().validate_token("not-a-jwt"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_tokens_without_expiry() {
        let result = service().validate_token(&token(json!({ "sub": "1" }), SECRET));
        assert_matches!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn non_numeric_subject_is_unknown_user() {
        let exp = Utc::now().timestamp() + 600;
        let result = service()
            .resolve_admin(&token(json!({ "sub": "admin@example.com", "exp": exp }), SECRET))
            .await;
        assert_matches!(result, Err(AuthError::UnknownUser));
    }
}
