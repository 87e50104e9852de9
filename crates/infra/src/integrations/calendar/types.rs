//! Google Calendar API wire types

use chrono::SecondsFormat;
use projectflow_domain::{CalendarEventDraft, RemoteEvent};
use serde::{Deserialize, Serialize};

/// Body for `events.insert` / `events.update`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoogleEventBody<'a> {
    pub summary: &'a str,
    pub description: &'a str,
    pub start: GoogleEventTime<'a>,
    pub end: GoogleEventTime<'a>,
    pub reminders: GoogleReminders,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoogleEventTime<'a> {
    pub date_time: String,
    pub time_zone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoogleReminders {
    pub use_default: bool,
}

impl<'a> From<&'a CalendarEventDraft> for GoogleEventBody<'a> {
    fn from(draft: &'a CalendarEventDraft) -> Self {
        Self {
            summary: &draft.summary,
            description: &draft.description,
            start: GoogleEventTime {
                date_time: draft.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                time_zone: &draft.time_zone,
            },
            end: GoogleEventTime {
                date_time: draft.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                time_zone: &draft.time_zone,
            },
            reminders: GoogleReminders { use_default: true },
        }
    }
}

/// The parts of an event resource we keep
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoogleEventResponse {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

impl From<GoogleEventResponse> for RemoteEvent {
    fn from(response: GoogleEventResponse) -> Self {
        Self { id: response.id, html_link: response.html_link }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn body_matches_calendar_api_shape() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let draft = CalendarEventDraft {
            summary: "[ProjectFlow] Ship".into(),
            description: "No description".into(),
            start,
            end: start + chrono::Duration::hours(1),
            time_zone: "UTC".into(),
        };

        let body = serde_json::to_value(GoogleEventBody::from(&draft)).unwrap();
        assert_eq!(
            body,
            json!({
                "summary": "[ProjectFlow] Ship",
                "description": "No description",
                "start": {"dateTime": "2024-05-01T09:00:00Z", "timeZone": "UTC"},
                "end": {"dateTime": "2024-05-01T10:00:00Z", "timeZone": "UTC"},
                "reminders": {"useDefault": true}
            })
        );
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let response: GoogleEventResponse = serde_json::from_value(json!({
            "kind": "calendar#event",
            "id": "evt123",
            "status": "confirmed",
            "htmlLink": "https://calendar.google.com/event?eid=evt123"
        }))
        .unwrap();

        let event = RemoteEvent::from(response);
        assert_eq!(event.id, "evt123");
        assert!(event.html_link.is_some());
    }
}
