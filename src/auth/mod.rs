//! Session handling: the external auth provider issues the cookie, this module reads it.

mod cookie;
mod middleware;

pub use cookie::{COOKIE_SESSION, DEFAULT_SESSION_DURATION, set_session_cookie};
pub use middleware::{AuthState, auth_guard};
