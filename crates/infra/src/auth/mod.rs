//! Credential adapters: JWT access/refresh tokens and argon2 password hashes

mod jwt;
mod password;

pub use jwt::JwtTokenIssuer;
pub use password::Argon2PasswordHasher;
