//! Account service - registration, credentials and statistics

use std::sync::Arc;

use projectflow_common::validation::{EmailValidator, StringValidator, ValidationError};
use projectflow_domain::constants::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};
use projectflow_domain::{
    CurrentUser, NewUser, ProjectFlowError, Result, TaskStatus, User, UserId, UserStatistics,
};
use tracing::{info, warn};

use super::ports::{
    PasswordHasher, ProfileRepository, RevokedTokenRepository, TokenIssuer, UserRepository,
};
use super::{AccessToken, AuthSession, LoginRequest, RegisterRequest, TokenKind};
use crate::projects::ports::ProjectRepository;
use crate::tasks::ports::TaskRepository;

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Account service
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    revoked: Arc<dyn RevokedTokenRepository>,
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        revoked: Arc<dyn RevokedTokenRepository>,
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self { users, profiles, hasher, tokens, revoked, projects, tasks }
    }

    /// Create a user and its profile, returning a fresh token pair.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        validate_registration(&username, &email, &request)?;

        if self.users.get_by_username(&username).await?.is_some() {
            return Err(invalid(ValidationError::field(
                "username",
                "A user with that username already exists.",
            )));
        }
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(invalid(ValidationError::field(
                "email",
                "A user with that email already exists.",
            )));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let (user, _profile) = self
            .users
            .create_with_profile(
                NewUser {
                    username,
                    email,
                    first_name: request.first_name.trim().to_string(),
                    last_name: request.last_name.trim().to_string(),
                },
                password_hash,
            )
            .await?;

        let tokens = self.tokens.issue_pair(user.id)?;
        info!(user_id = user.id, "User registered");
        Ok(AuthSession { user: user.summary(), tokens })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ProjectFlowError::Validation(
                "username and password are required".into(),
            ));
        }

        let Some((user, password_hash)) = self.users.get_credentials(username).await? else {
            warn!("Login attempt for unknown username");
            return Err(ProjectFlowError::Authentication(INVALID_CREDENTIALS.into()));
        };
        if !self.hasher.verify(&request.password, &password_hash).await? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(ProjectFlowError::Authentication(INVALID_CREDENTIALS.into()));
        }

        let tokens = self.tokens.issue_pair(user.id)?;
        info!(user_id = user.id, "User logged in");
        Ok(AuthSession { user: user.summary(), tokens })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken> {
        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;
        if self.revoked.is_revoked(&claims.token_id).await? {
            return Err(ProjectFlowError::Authentication("Token is blacklisted".into()));
        }
        let access = self.tokens.issue_access(claims.user_id)?;
        Ok(AccessToken { access })
    }

    /// Revoke the caller's refresh token.
    pub async fn logout(&self, user_id: UserId, refresh_token: Option<&str>) -> Result<()> {
        let refresh_token = refresh_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ProjectFlowError::Validation("Refresh token is required".into()))?;

        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;
        if claims.user_id != user_id {
            return Err(ProjectFlowError::Permission(
                "Refresh token belongs to another user".into(),
            ));
        }
        self.revoked.revoke(&claims.token_id, user_id, claims.expires_at).await?;
        info!(user_id, "User logged out");
        Ok(())
    }

    /// Resolve the user behind a bearer access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<User> {
        let claims = self.tokens.decode(access_token, TokenKind::Access)?;
        self.user(claims.user_id).await
    }

    pub async fn user(&self, user_id: UserId) -> Result<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ProjectFlowError::Authentication("User not found".into()))
    }

    pub async fn current_user(&self, user_id: UserId) -> Result<CurrentUser> {
        let user = self.user(user_id).await?;
        let profile = self.profiles.get_by_user(user_id).await?.ok_or_else(|| {
            ProjectFlowError::Internal(format!("Profile missing for user {}", user_id))
        })?;
        Ok(CurrentUser { user: user.summary(), profile: profile.summary() })
    }

    pub async fn statistics(&self, user_id: UserId) -> Result<UserStatistics> {
        Ok(UserStatistics {
            projects_count: self.projects.count_for_member(user_id).await?,
            tasks_count: self.tasks.count_assigned(user_id, None).await?,
            completed_tasks_count: self.tasks.count_assigned(user_id, Some(TaskStatus::Done)).await?,
        })
    }
}

fn validate_registration(username: &str, email: &str, request: &RegisterRequest) -> Result<()> {
    let mut errors = ValidationError::new();
    errors.check(
        "username",
        username,
        &StringValidator::new().not_empty().max_length(MAX_USERNAME_LENGTH),
    );
    errors.check("email", email, &EmailValidator::new());

    if request.password.is_empty() {
        errors.add_field_error("password", "This field may not be blank.");
    } else if request.password != request.password2 {
        errors.add_field_error("password", "Password fields didn't match.");
    } else {
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add_field_error(
                "password",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            );
        }
        if request.password.chars().all(|c| c.is_ascii_digit()) {
            errors.add_field_error("password", "This password is entirely numeric.");
        }
    }

    errors.into_result().map_err(invalid)
}

fn invalid(errors: ValidationError) -> ProjectFlowError {
    ProjectFlowError::Validation(errors.to_string())
}
