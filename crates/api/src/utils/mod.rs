pub mod command_helpers;
pub mod health;
pub mod logging;
pub mod session_cookie;
