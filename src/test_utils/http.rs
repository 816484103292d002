use axum::{http::StatusCode, http::header::SET_COOKIE, response::IntoResponse};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;

use crate::{
    AppState, UserId,
    app_state::create_cookie_key,
    auth::{DEFAULT_SESSION_DURATION, set_session_cookie},
    build_router,
};

const TEST_SECRET: &str = "aqwertyuiop[]asdfghjkl;'zxcvbnm,./";

/// Serve the full router over `connection`, in the UTC timezone.
#[track_caller]
pub(crate) fn get_test_server(connection: Connection) -> TestServer {
    let state =
        AppState::new(connection, TEST_SECRET, "Etc/UTC").expect("Could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server")
}

/// A session cookie for `user_id` that the test server will accept.
#[track_caller]
pub(crate) fn session_cookie(user_id: UserId) -> Cookie<'static> {
    let jar = PrivateCookieJar::new(create_cookie_key(TEST_SECRET));
    let jar = set_session_cookie(jar, user_id, DEFAULT_SESSION_DURATION)
        .expect("Could not set session cookie");

    let response = jar.into_response();
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("Session cookie missing")
        .to_str()
        .expect("Could not convert header to str")
        .to_owned();

    Cookie::parse(set_cookie).expect("Could not parse session cookie")
}

/// Check the status code and that the body is a JSON error message.
#[track_caller]
pub(crate) fn assert_error_response(response: &TestResponse, status: StatusCode) {
    response.assert_status(status);

    let body: serde_json::Value = response.json();
    assert!(
        body["error"].is_string(),
        "want a JSON error message, got {body}"
    );
}
