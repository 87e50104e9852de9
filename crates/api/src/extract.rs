//! Request extractors

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use projectflow_domain::{ProjectFlowError, User, UserId};
use tracing::debug;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::utils::session_cookie::read_session_id;

/// Authenticated caller.
///
/// Resolved from `Authorization: Bearer <access token>` first, then from the
/// session cookie so that browser redirects (the calendar callback resuming a
/// sync) stay authenticated.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Session id sent by the client, whether or not it is still valid
    pub session_id: Option<String>,
}

impl AuthUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

impl FromRequestParts<Arc<AppContext>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let session_id = read_session_id(&parts.headers);

        if let Some(token) = bearer_token(parts)? {
            let user = ctx.accounts.authenticate(token).await?;
            return Ok(Self { user, session_id });
        }

        if let Some(id) = session_id.as_deref() {
            if let Some(session) = ctx.sessions.resume(id).await? {
                let user = ctx.accounts.user(session.user_id()).await?;
                debug!(user_id = user.id, "request authenticated by session");
                return Ok(Self { user, session_id });
            }
        }

        Err(ApiError(ProjectFlowError::Authentication(
            "Authentication credentials were not provided".into(),
        )))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        ApiError(ProjectFlowError::Authentication("Malformed Authorization header".into()))
    })?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(ApiError(ProjectFlowError::Authentication(
            "Authorization header must use the Bearer scheme".into(),
        ))),
    }
}

/// JSON body whose rejection is reported as a validation error
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(ProjectFlowError::Validation(rejection.body_text()))),
        }
    }
}

/// Query string whose rejection is reported as a validation error
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(ProjectFlowError::Validation(rejection.body_text()))),
        }
    }
}
