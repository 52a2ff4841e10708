//! Bearer-token sessions.
//!
//! Every request carries a JWT identifying `(user_id, branch_id, account_id)`;
//! handlers receive it through the [`AuthenticatedUser`] extractor and scope
//! every query by those ids. User and session management itself lives in a
//! separate service; this module only mints (for tests/tooling) and verifies
//! tokens.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ApiError, ServiceError};
use crate::AppState;

/// JWT claims for a branch-scoped session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Branch the session operates on
    pub branch_id: Uuid,
    /// Tenant (account) owning the branch
    pub account_id: Uuid,
    /// Role name, informational for this service
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Auth configuration derived from [`crate::config::AppConfig`].
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub expiration_secs: usize,
}

/// Verifies and (for tests and first-party tooling) issues bearer tokens.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expiration: Duration,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.clone()]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            expiration: Duration::seconds(config.expiration_secs as i64),
        }
    }

    /// Mints a token for the given session identity.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        branch_id: Uuid,
        account_id: Uuid,
        role: &str,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            branch_id,
            account_id,
            role: role.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Unauthorized(format!("failed to sign token: {}", e)))
    }

    /// Verifies a bearer token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthorized("invalid or expired token".to_string()))
    }
}

/// The session identity extracted from the bearer token.
///
/// Every handler takes this extractor; service calls pass `branch_id` /
/// `account_id` through so that no query can forget tenant scoping.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub branch_id: Uuid,
    pub account_id: Uuid,
    pub role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

        let claims = state.auth.verify_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            branch_id: claims.branch_id,
            account_id: claims.account_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret: "test-secret-long-enough-for-hs256".to_string(),
            issuer: "salonkit-api".to_string(),
            expiration_secs: 3600,
        })
    }

    #[test]
    fn tokens_round_trip() {
        let svc = service();
        let user = Uuid::new_v4();
        let branch = Uuid::new_v4();
        let account = Uuid::new_v4();

        let token = svc.issue_token(user, branch, account, "manager").unwrap();
        let claims = svc.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.branch_id, branch);
        assert_eq!(claims.account_id, account);
        assert_eq!(claims.role, "manager");
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let svc = service();
        let other = AuthService::new(AuthConfig {
            secret: "test-secret-long-enough-for-hs256".to_string(),
            issuer: "someone-else".to_string(),
            expiration_secs: 3600,
        });

        let token = other
            .issue_token(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "manager")
            .unwrap();
        assert!(svc.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(service().verify_token("not-a-jwt").is_err());
    }
}
