use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing session credential")]
    MissingCredential,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

/// Who is calling, and which team they have selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
}

/// Claim structure for session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // User ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>, // Selected team
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Resolves the caller from request headers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Identity, AuthError>;
}

/// Verifies HS256 session tokens from `Authorization: Bearer` or the session cookie
#[derive(Clone)]
pub struct JwtIdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str, issuer: &str, cookie_name: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            cookie_name: cookie_name.to_string(),
        }
    }

    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            &cfg.session_secret,
            &cfg.session_issuer,
            &cfg.session_cookie_name,
        )
    }

    fn credential(&self, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if bearer.is_some() {
            return bearer;
        }

        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
            .filter(|t| !t.is_empty())
    }

    /// Validates a raw token and extracts the identity it carries
    pub fn decode_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let team_id = match claims.team_id.as_deref() {
            Some(raw) if !raw.is_empty() => {
                Some(Uuid::parse_str(raw).map_err(|_| AuthError::InvalidToken)?)
            }
            _ => None,
        };

        Ok(Identity { user_id, team_id })
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = self
            .credential(headers)
            .ok_or(AuthError::MissingCredential)?;
        self.decode_token(&token)
    }
}

/// Signs a session token. Used by tooling and tests; production tokens come from
/// the auth provider sharing the same secret.
pub fn issue_session_token(
    secret: &str,
    issuer: &str,
    user_id: Uuid,
    team_id: Option<Uuid>,
    ttl: ChronoDuration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        team_id: team_id.map(|t| t.to_string()),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        iss: issuer.to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    const SECRET: &str = "unit-test-session-secret-0123456789abcdef";
    const ISSUER: &str = "mes-auth";

    fn resolver() -> JwtIdentityResolver {
        JwtIdentityResolver::new(SECRET, ISSUER, "mes_session")
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn resolves_user_and_team_from_bearer_token() {
        let user = Uuid::new_v4();
        let team = Uuid::new_v4();
        let token =
            issue_session_token(SECRET, ISSUER, user, Some(team), ChronoDuration::hours(1)).unwrap();

        let identity = resolver().resolve(&bearer(&token)).await.unwrap();
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.team_id, Some(team));
    }

    #[tokio::test]
    async fn falls_back_to_session_cookie() {
        let user = Uuid::new_v4();
        let token = issue_session_token(SECRET, ISSUER, user, None, ChronoDuration::hours(1)).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; mes_session={token}")).unwrap(),
        );
        let identity = resolver().resolve(&headers).await.unwrap();
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.team_id, None);
    }

    #[tokio::test]
    async fn rejects_missing_foreign_and_expired_tokens() {
        assert_matches!(
            resolver().resolve(&HeaderMap::new()).await,
            Err(AuthError::MissingCredential)
        );

        let forged = issue_session_token(
            "some-other-secret-that-is-long-enough!!",
            ISSUER,
            Uuid::new_v4(),
            None,
            ChronoDuration::hours(1),
        )
        .unwrap();
        assert_matches!(
            resolver().resolve(&bearer(&forged)).await,
            Err(AuthError::InvalidToken)
        );

        let expired = issue_session_token(
            SECRET,
            ISSUER,
            Uuid::new_v4(),
            None,
            ChronoDuration::hours(-2),
        )
        .unwrap();
        assert_matches!(
            resolver().resolve(&bearer(&expired)).await,
            Err(AuthError::TokenExpired)
        );
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let token = issue_session_token(
            SECRET,
            "someone-else",
            Uuid::new_v4(),
            None,
            ChronoDuration::hours(1),
        )
        .unwrap();
        assert_matches!(
            resolver().resolve(&bearer(&token)).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn mock_resolver_can_stand_in_for_jwt() {
        let user = Uuid::new_v4();
        let mut mock = MockIdentityResolver::new();
        mock.expect_resolve().times(1).returning(move |_| {
            Ok(Identity {
                user_id: user,
                team_id: None,
            })
        });

        let resolver: Box<dyn IdentityResolver> = Box::new(mock);
        let identity = resolver.resolve(&HeaderMap::new()).await.unwrap();
        assert_eq!(identity.user_id, user);
    }
}
