pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: String, is_admin: bool, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: username,
            is_admin,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Generation(String),
    Verification(String),
    InvalidSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
            TokenError::Verification(msg) => write!(f, "token verification error: {}", msg),
            TokenError::InvalidSecret => write!(f, "invalid JWT secret"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign `claims` into a token. The secret is passed in explicitly so callers
/// can issue against fabricated secrets in tests.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify and decode a token. Any invalid input (bad signature, malformed
/// structure, expired) fails; callers treat every failure identically.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| TokenError::Verification(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let claims = Claims::new("aliya".to_string(), false, 1);
        let token = issue_token(&claims, SECRET).unwrap();

        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "aliya");
        assert!(!decoded.is_admin);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let claims = Claims::new("aliya".to_string(), true, 1);
        let token = issue_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn malformed_token_fails_verification() {
        assert!(verify_token("not-a-token", SECRET).is_err());
        assert!(verify_token("", SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new("aliya".to_string(), false, 1);
        assert!(issue_token(&claims, "").is_err());
        assert!(verify_token("whatever", "").is_err());
    }
}
