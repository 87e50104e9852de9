//! Argon2id password hashing in PHC string format
//!
//! Both operations run on the blocking thread pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier};
use async_trait::async_trait;
use projectflow_core::PasswordHasher;
use projectflow_domain::{ProjectFlowError, Result};
use tokio::task;

use crate::database::codec::map_join_error;

#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        task::spawn_blocking(move || hash_password(&argon2, &password))
            .await
            .map_err(map_join_error)?
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        task::spawn_blocking(move || verify_password(&argon2, &password, &password_hash))
            .await
            .map_err(map_join_error)?
    }
}

fn hash_password(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ProjectFlowError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(argon2: &Argon2<'_>, password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| ProjectFlowError::Internal(format!("Stored password hash is unreadable: {}", e)))?;

    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(ProjectFlowError::Internal(format!("Password verification failed: {}", e))),
    }
}
