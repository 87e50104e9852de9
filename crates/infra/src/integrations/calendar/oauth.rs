//! OAuth2 authorization-code flow against Google's endpoints.
//!
//! Authorization URLs request offline access with forced consent so the
//! token endpoint returns a refresh token on every grant.

use async_trait::async_trait;
use chrono::Utc;
use oauth2::basic::{
    BasicClient, BasicErrorResponse, BasicRevocationErrorResponse,
    BasicTokenIntrospectionResponse, BasicTokenResponse,
};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, Scope, StandardRevocableToken,
    TokenResponse, TokenUrl,
};
use projectflow_core::CalendarAuthProvider;
use projectflow_domain::{CalendarConfig, ProjectFlowError, Result, TokenGrant};
use tracing::{debug, warn};

type ConfiguredClient = oauth2::Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

type TokenError = RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

/// Google OAuth2 client for the calendar scope
pub struct GoogleCalendarOAuth {
    client: ConfiguredClient,
    http: reqwest::Client,
    scopes: Vec<String>,
}

impl GoogleCalendarOAuth {
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(config.authorization_endpoint.clone()).map_err(|e| {
                ProjectFlowError::Config(format!("Invalid authorization endpoint: {}", e))
            })?)
            .set_token_uri(TokenUrl::new(config.token_endpoint.clone()).map_err(|e| {
                ProjectFlowError::Config(format!("Invalid token endpoint: {}", e))
            })?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| {
                ProjectFlowError::Config(format!("Invalid redirect URI: {}", e))
            })?);

        // Token endpoints must not redirect.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ProjectFlowError::Config(format!("Failed to build OAuth HTTP client: {}", e))
            })?;

        Ok(Self { client, http, scopes: config.scopes.clone() })
    }
}

#[async_trait]
impl CalendarAuthProvider for GoogleCalendarOAuth {
    fn authorization_url(&self, state: &str) -> Result<String> {
        let state = state.to_string();
        let (url, _csrf) = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .add_extra_param("include_granted_scopes", "true")
            .url();
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| map_token_error("code exchange", e))?;

        debug!(has_refresh_token = token.refresh_token().is_some(), "authorization code exchanged");
        Ok(grant_from(&token))
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let token = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| map_token_error("token refresh", e))?;

        debug!("calendar access token refreshed");
        Ok(grant_from(&token))
    }
}

fn grant_from(token: &BasicTokenResponse) -> TokenGrant {
    let now = Utc::now();
    TokenGrant {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        expires_at: token
            .expires_in()
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| now + ttl),
    }
}

fn map_token_error(operation: &str, err: TokenError) -> ProjectFlowError {
    match err {
        RequestTokenError::ServerResponse(response) => {
            warn!(operation, error = %response.error(), "provider rejected token request");
            let detail = response
                .error_description()
                .map(|d| format!("{}: {}", response.error(), d))
                .unwrap_or_else(|| response.error().to_string());
            ProjectFlowError::Authentication(format!("{} rejected: {}", operation, detail))
        }
        RequestTokenError::Request(e) => {
            warn!(operation, error = %e, "token request failed");
            ProjectFlowError::ExternalService(format!("{} failed: {}", operation, e))
        }
        RequestTokenError::Parse(e, _body) => ProjectFlowError::ExternalService(format!(
            "{} returned an unreadable response: {}",
            operation, e
        )),
        RequestTokenError::Other(message) => {
            ProjectFlowError::ExternalService(format!("{} failed: {}", operation, message))
        }
    }
}
