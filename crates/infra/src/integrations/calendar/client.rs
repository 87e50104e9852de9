//! Calendar API client
//!
//! Writes events to the authenticated user's primary calendar. Every call
//! carries the caller's bearer token and is bounded by the configured
//! request timeout.

use std::time::Duration;

use async_trait::async_trait;
use projectflow_core::CalendarEventGateway;
use projectflow_domain::constants::CALENDAR_PRIMARY_ID;
use projectflow_domain::{CalendarEventDraft, ProjectFlowError, RemoteEvent, Result};
use reqwest::{Client, RequestBuilder};
use tracing::debug;
use url::Url;

use super::types::{GoogleEventBody, GoogleEventResponse};
use crate::errors::{from_status, InfraError};

/// Google Calendar v3 client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    http: Client,
    api_base: Url,
}

impl GoogleCalendarClient {
    /// Create a client for `api_base_url` (e.g. `https://www.googleapis.com/calendar/v3`).
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base_url).map_err(|e| {
            ProjectFlowError::Config(format!("Invalid calendar API base URL: {}", e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(ProjectFlowError::Config(format!(
                "Calendar API base URL cannot be a base: {}",
                api_base_url
            )));
        }

        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            ProjectFlowError::Config(format!("Failed to build calendar HTTP client: {}", e))
        })?;

        Ok(Self { http, api_base })
    }

    fn events_url(&self, event_id: Option<&str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["calendars", CALENDAR_PRIMARY_ID, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<RemoteEvent> {
        let response = request.send().await.map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(from_status(status, body.as_deref()));
        }

        let event: GoogleEventResponse = response.json().await.map_err(|e| {
            ProjectFlowError::ExternalService(format!("Failed to parse calendar response: {}", e))
        })?;
        Ok(event.into())
    }
}

#[async_trait]
impl CalendarEventGateway for GoogleCalendarClient {
    async fn create_event(
        &self,
        access_token: &str,
        draft: &CalendarEventDraft,
    ) -> Result<RemoteEvent> {
        let url = self.events_url(None);
        debug!(%url, "creating calendar event");

        let request =
            self.http.post(url).bearer_auth(access_token).json(&GoogleEventBody::from(draft));
        self.send(request).await
    }

    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        draft: &CalendarEventDraft,
    ) -> Result<RemoteEvent> {
        let url = self.events_url(Some(event_id));
        debug!(%url, event_id, "updating calendar event");

        let request =
            self.http.put(url).bearer_auth(access_token).json(&GoogleEventBody::from(draft));
        self.send(request).await
    }
}
