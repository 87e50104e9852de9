//! Deterministic password hasher and token issuer fakes

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use projectflow_core::{PasswordHasher, TokenClaims, TokenIssuer, TokenKind, TokenPair};
use projectflow_domain::{ProjectFlowError, Result as DomainResult, UserId};

/// Stores passwords as `plain:<password>`.
#[derive(Default)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        Ok(format!("plain:{}", password))
    }

    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        let stored = password_hash
            .strip_prefix("plain:")
            .ok_or_else(|| ProjectFlowError::Internal("unreadable hash".into()))?;
        Ok(stored == password)
    }
}

/// Issues `<kind>.<user>.<n>` tokens that decode without a signature.
#[derive(Default)]
pub struct SequentialTokenIssuer {
    counter: AtomicU64,
}

impl SequentialTokenIssuer {
    fn token(&self, kind: &str, user_id: UserId) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}.{}.{}", kind, user_id, n)
    }
}

impl TokenIssuer for SequentialTokenIssuer {
    fn issue_pair(&self, user_id: UserId) -> DomainResult<TokenPair> {
        Ok(TokenPair { refresh: self.token("refresh", user_id), access: self.token("access", user_id) })
    }

    fn issue_access(&self, user_id: UserId) -> DomainResult<String> {
        Ok(self.token("access", user_id))
    }

    fn decode(&self, token: &str, expected: TokenKind) -> DomainResult<TokenClaims> {
        let invalid = || ProjectFlowError::Authentication("Token is invalid or expired".into());
        let mut parts = token.split('.');
        let kind = match parts.next() {
            Some("access") => TokenKind::Access,
            Some("refresh") => TokenKind::Refresh,
            _ => return Err(invalid()),
        };
        if kind != expected {
            return Err(invalid());
        }
        let user_id = parts.next().and_then(|id| id.parse().ok()).ok_or_else(invalid)?;
        Ok(TokenClaims {
            user_id,
            token_id: token.to_string(),
            kind,
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}
