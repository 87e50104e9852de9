//! Google Calendar adapters: OAuth2 authorization-code flow and event writes
//! on the user's primary calendar.

mod client;
mod oauth;
mod types;

pub use client::GoogleCalendarClient;
pub use oauth::GoogleCalendarOAuth;
