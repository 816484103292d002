#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{TestData, get_test_data, insert_transaction};
pub(crate) use http::{assert_error_response, get_test_server, session_cookie};
