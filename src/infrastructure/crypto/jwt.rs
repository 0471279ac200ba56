//! Bearer tokens for the operator console and worker self-service

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

const ISSUER: &str = "gatekeeper";

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            expiration_hours: security.jwt_expiration_hours,
            issuer: ISSUER.to_string(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl JwtConfig {
    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

/// Claims carried by a session token. `sub` is the worker id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

/// Sign a token valid for `config.expiration_hours` from now.
pub fn create_token(
    worker_id: &str,
    email: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued = Utc::now();
    let claims = TokenClaims {
        sub: worker_id.to_owned(),
        email: email.to_owned(),
        role: role.to_owned(),
        exp: (issued + Duration::hours(config.expiration_hours)).timestamp(),
        iat: issued.timestamp(),
        iss: config.issuer.clone(),
    };
    let key = EncodingKey::from_secret(config.secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// Check signature, issuer and expiry. An expired token fails with
/// `ErrorKind::ExpiredSignature`.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<TokenClaims>(token, &key, &config.validation()).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn issued_token_verifies() {
        let config = JwtConfig::default();
        let token = create_token("w-1", "ana@example.com", "supervisor", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "w-1");
        assert_eq!(claims.role, "supervisor");
        assert_eq!(claims.iss, "gatekeeper");
        assert_eq!(claims.exp - claims.iat, config.expiration_hours * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = JwtConfig::default();
        let token = create_token("w-1", "ana@example.com", "admin", &config).unwrap();

        let other = JwtConfig {
            secret: "another-secret-of-enough-length".into(),
            ..config
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn stale_token_reports_expiry() {
        let config = JwtConfig {
            expiration_hours: -2,
            ..JwtConfig::default()
        };
        let token = create_token("w-1", "ana@example.com", "worker", &config).unwrap();
        let err = verify_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }
}
