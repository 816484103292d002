//! Reads and writes the encrypted session cookie that identifies the current user.
//!
//! The session is established by the external auth provider, which shares the
//! cookie secret with this server. The server only needs to read the cookie,
//! but [set_session_cookie] is provided for the provider side and for tests.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserId};

/// The name of the cookie holding the session token.
pub const COOKIE_SESSION: &str = "session";
/// The default duration for which session cookies are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(8);

/// The contents of the session cookie.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct Token {
    pub user_id: UserId,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

/// Add a session cookie for `user_id` to the cookie jar that expires `duration` from now.
///
/// # Errors
///
/// Returns an [Error::Unauthenticated] if the token cannot be serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token).map_err(|error| {
        tracing::error!("could not serialize session token: {error}");
        Error::Unauthenticated
    })?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, token_string))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
            .path("/"),
    ))
}

/// Get the user ID from the session cookie in `jar`.
///
/// # Errors
///
/// Returns an [Error::Unauthenticated] if the cookie is missing, cannot be
/// decrypted or parsed, or has expired relative to `now`.
pub(crate) fn get_user_id_from_session(
    jar: &PrivateCookieJar,
    now: OffsetDateTime,
) -> Result<UserId, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::Unauthenticated)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::Unauthenticated)?;

    if token.expires_at <= now {
        return Err(Error::Unauthenticated);
    }

    Ok(token.user_id)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, UserId,
        auth::cookie::{COOKIE_SESSION, DEFAULT_SESSION_DURATION, get_user_id_from_session},
    };

    use super::set_session_cookie;

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn get_user_id_from_session_succeeds() {
        let user_id = UserId::new(1);
        let jar = set_session_cookie(get_jar(), user_id, DEFAULT_SESSION_DURATION).unwrap();

        let got = get_user_id_from_session(&jar, OffsetDateTime::now_utc());

        assert_eq!(got, Ok(user_id));
    }

    #[test]
    fn session_cookie_is_locked_down() {
        let jar = set_session_cookie(get_jar(), UserId::new(1), DEFAULT_SESSION_DURATION).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn expired_session_is_rejected() {
        let jar = set_session_cookie(get_jar(), UserId::new(1), Duration::minutes(5)).unwrap();

        let got = get_user_id_from_session(&jar, OffsetDateTime::now_utc() + Duration::hours(1));

        assert_eq!(got, Err(Error::Unauthenticated));
    }

    #[test]
    fn missing_cookie_is_rejected() {
        assert_eq!(
            get_user_id_from_session(&get_jar(), OffsetDateTime::now_utc()),
            Err(Error::Unauthenticated)
        );
    }

    #[test]
    fn garbage_cookie_is_rejected() {
        let jar = get_jar().add(Cookie::new(COOKIE_SESSION, "FOOBAR"));

        assert_eq!(
            get_user_id_from_session(&jar, OffsetDateTime::now_utc()),
            Err(Error::Unauthenticated)
        );
    }
}
