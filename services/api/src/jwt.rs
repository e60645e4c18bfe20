//! JWT service for session token issuance and validation
//!
//! Session tokens are HS256-signed claims binding a username to an expiry
//! instant. Validation is stateless: nothing is stored server side and there
//! is no revocation.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Shortest signing secret accepted at startup
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Session lifetime in days (default: 7)
    pub token_expiry_days: i64,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Username the session is bound to
    pub sub: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET_KEY must be at least {} characters",
                MIN_SECRET_LENGTH
            );
        }
        if config.token_expiry_days <= 0 {
            anyhow::bail!("JWT_TOKEN_EXPIRY_DAYS must be positive");
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Issue a session token for `username`
    pub fn issue_token(&self, username: &str) -> Result<String> {
        self.issue_token_at(username, Utc::now())
    }

    /// Issue a token as if it were `issued_at`; expiry is fixed at issuance
    pub fn issue_token_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = issued_at + Duration::days(self.config.token_expiry_days);
        let claims = Claims {
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
