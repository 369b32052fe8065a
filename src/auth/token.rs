//! Signed session tokens (HS256).
//!
//! The only claim the service relies on is `sub`, the account id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

pub fn issue(account_id: Uuid, secret: &str, ttl_hours: i64) -> anyhow::Result<String> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp();
    let claims = Claims {
        sub: account_id,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify(token: &str, secret: &str) -> Result<Uuid, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|_| AppError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_verify_round_trip() {
        let id = Uuid::new_v4();
        let token = issue(id, SECRET, 24).unwrap();
        assert_eq!(verify(&token, SECRET).unwrap(), id);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = issue(Uuid::new_v4(), SECRET, 24).unwrap();
        assert!(verify(&token, "other-secret").is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        // Issued two hours in the past; outside the default leeway.
        let token = issue(Uuid::new_v4(), SECRET, -2).unwrap();
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let token = issue(Uuid::new_v4(), SECRET, 24).unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = parts[1].chars().rev().collect();
        assert!(verify(&parts.join("."), SECRET).is_err());
    }

    #[test]
    fn verify_rejects_unsigned_token() {
        // Well-formed header and payload with a junk signature segment.
        assert!(verify("eyJhbGciOiJIUzI1NiJ9.eyJ1c2VySWQiOiJ4In0.signature", SECRET).is_err());
    }
}
