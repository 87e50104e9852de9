//! Port interfaces for accounts, profiles and token handling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use projectflow_domain::{CalendarCredentials, NewUser, Profile, Result, User, UserId};

use super::{TokenClaims, TokenKind, TokenPair};

/// Trait for user persistence and retrieval
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user and its profile in a single transaction.
    ///
    /// Fails with `Validation` when the username or email is taken.
    async fn create_with_profile(&self, user: NewUser, password_hash: String)
        -> Result<(User, Profile)>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Case-insensitive lookup.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// User plus stored password hash, for login.
    async fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>>;

    /// Users with the given ids; unknown ids are skipped.
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// All users ordered by username.
    async fn list_all(&self) -> Result<Vec<User>>;
}

/// Trait for the per-user profile holding calendar credentials
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_by_user(&self, user_id: UserId) -> Result<Option<Profile>>;

    /// Overwrite the stored calendar token triple.
    async fn save_calendar_credentials(
        &self,
        user_id: UserId,
        credentials: &CalendarCredentials,
    ) -> Result<Profile>;
}

/// One-way password hashing
///
/// Implementations must not run the hash on an async worker thread.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` for a wrong password; `Err` only for an unreadable hash.
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool>;
}

/// Signed access/refresh token issuance
pub trait TokenIssuer: Send + Sync {
    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair>;

    fn issue_access(&self, user_id: UserId) -> Result<String>;

    /// Verify signature, expiry and kind.
    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims>;
}

/// Blacklist of refresh tokens invalidated by logout
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    async fn revoke(&self, token_id: &str, user_id: UserId, expires_at: DateTime<Utc>)
        -> Result<()>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool>;
}
