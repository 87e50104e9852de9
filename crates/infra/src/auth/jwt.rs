//! HS256 access/refresh token issuer

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use projectflow_core::{TokenClaims, TokenIssuer, TokenKind, TokenPair};
use projectflow_domain::{ProjectFlowError, Result, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InfraError;

/// Wire claims. `jti` makes every token unique so refresh tokens can be
/// blacklisted individually.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    kind: TokenKind,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: seconds(access_ttl_secs),
            refresh_ttl: seconds(refresh_ttl_secs),
        }
    }

    fn sign(&self, user_id: UserId, kind: TokenKind, now: DateTime<Utc>) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            kind,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ProjectFlowError::Internal(format!("Failed to sign token: {}", e)))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            refresh: self.sign(user_id, TokenKind::Refresh, now)?,
            access: self.sign(user_id, TokenKind::Access, now)?,
        })
    }

    fn issue_access(&self, user_id: UserId) -> Result<String> {
        self.sign(user_id, TokenKind::Access, Utc::now())
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| ProjectFlowError::from(InfraError::from(e)))?;
        let claims = data.claims;

        if claims.kind != expected {
            return Err(ProjectFlowError::Authentication("Token has wrong type".into()));
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| ProjectFlowError::Authentication("Token is invalid".into()))?;

        Ok(TokenClaims { user_id: claims.sub, token_id: claims.jti, kind: expected, expires_at })
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}
