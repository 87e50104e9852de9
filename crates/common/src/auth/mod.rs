//! Opaque nonces for OAuth state and server-side sessions.

pub mod state;

pub use state::{generate_session_id, generate_state, validate_state};
