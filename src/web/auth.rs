//! Bearer-token authentication for the web API.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

use super::AppState;

/// Default lifetime of CLI-issued tokens (30 days).
pub const TOKEN_EXPIRATION_SECS: u64 = 30 * 86_400;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued at
}

fn now_secs() -> Result<usize> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Auth(e.to_string()))?
        .as_secs() as usize)
}

/// Issue a token for a user id.
pub fn issue_token(secret: &str, user_id: &str, ttl_secs: u64) -> Result<String> {
    let now = now_secs()?;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl_secs as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Auth(e.to_string()))
}

/// Validate a token and return its claims.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| Error::Auth(e.to_string()))?;

    Ok(data.claims)
}

fn extract_bearer(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ")
}

/// Authenticated caller identity, extracted from the Authorization header.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = extract_bearer(header).ok_or(StatusCode::UNAUTHORIZED)?;
        let claims =
            validate_token(&state.jwt_secret, token).map_err(|_| StatusCode::UNAUTHORIZED)?;
        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_validate_round_trip() {
        let token = issue_token("secret", "u1", 60).unwrap();
        let claims = validate_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", "u1", 60).unwrap();
        assert!(validate_token("other", &token).is_err());
    }

    #[test]
    fn bearer_extraction_requires_the_scheme() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer(Some("Basic abc")), None);
        assert_eq!(extract_bearer(None), None);
    }
}
