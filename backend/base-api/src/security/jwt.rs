//! JWT issuance and validation (HS256).

use crate::error::Result;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Unique token id; makes every issued token distinct
    pub jti: String,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl_secs: i64,
}

impl JwtCodec {
    pub fn new(secret: &str, issuer: &str, audience: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl_secs,
        }
    }

    /// Issue a token for `user_id`; returns the token and its expiry.
    pub fn issue(&self, user_id: i64) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.ttl_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok((token, expires_at))
    }

    /// Validate signature, expiry, issuer and audience.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> JwtCodec {
        JwtCodec::new(
            "test-secret-key-which-is-long-enough",
            "base-api",
            "base-api-users",
            3600,
        )
    }

    #[test]
    fn issue_then_decode_round_trip() {
        let codec = codec();
        let (token, expires_at) = codec.issue(42).unwrap();

        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.expires_at().timestamp(), expires_at.timestamp());
    }

    #[test]
    fn two_tokens_for_the_same_user_are_distinct() {
        let codec = codec();
        let (a, _) = codec.issue(42).unwrap();
        let (b, _) = codec.issue(42).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let codec = codec();
        let other = JwtCodec::new(
            "test-secret-key-which-is-long-enough",
            "base-api",
            "someone-else",
            3600,
        );
        let (token, _) = other.issue(42).unwrap();
        assert!(codec.decode(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec();
        let (mut token, _) = codec.issue(42).unwrap();
        token.push('x');
        assert!(codec.decode(&token).is_err());
    }
}
