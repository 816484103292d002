//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found, or it belongs to another user.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to pay a bill payment that has already been paid.
    #[error("the bill payment has already been paid")]
    AlreadyPaid,

    /// Tried to reverse a bill payment that has not been paid.
    #[error("the bill payment has not been paid")]
    NotPaid,

    /// Tried to delete a transaction that records a bill payment.
    ///
    /// The bill payment should be unmarked instead, which can delete the transaction.
    #[error("the transaction records a paid bill, unmark the bill payment instead")]
    LinkedToBillPayment,

    /// A budget period string did not match any known period.
    #[error("\"{0}\" is not a valid budget period")]
    InvalidPeriod(String),

    /// A bill frequency string did not match any known frequency.
    #[error("\"{0}\" is not a valid bill frequency")]
    InvalidFrequency(String),

    /// A transaction type string did not match any known type.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// A bank kind string did not match any known kind.
    #[error("\"{0}\" is not a valid bank kind")]
    InvalidBankKind(String),

    /// A payment status string did not match any known status.
    #[error("\"{0}\" is not a valid payment status")]
    InvalidPaymentStatus(String),

    /// A date range ends before it starts.
    #[error("the end date {end} is before the start date {start}")]
    InvalidDateRange { start: time::Date, end: time::Date },

    /// A billing cycle day was outside of 1 to 31.
    #[error("{0} is not a valid day of the month, expected a number from 1 to 31")]
    InvalidBillingDay(u8),

    /// A credit card was created without a billing cycle configuration.
    #[error("credit cards require a billing cycle configuration")]
    MissingBillingConfig,

    /// A plain bank account was given a billing cycle configuration.
    #[error("only credit cards can have a billing cycle configuration")]
    UnexpectedBillingConfig,

    /// Billing cycles were requested for an account that is not a credit card.
    #[error("the account is not a credit card")]
    NotACreditCard,

    /// An empty string was used as a name.
    #[error("name cannot be empty")]
    EmptyName,

    /// An amount that must be positive was zero or negative.
    #[error("{0} is not a positive amount")]
    NonPositiveAmount(f64),

    /// A query referenced a row that does not exist, e.g. a category ID.
    #[error("a referenced record does not exist")]
    InvalidForeignKey,

    /// The specified name already exists for the user.
    #[error("the name \"{0}\" is already in use")]
    DuplicateName(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The request body could not be read.
    #[error("could not read the request body")]
    InvalidRequestBody,

    /// The response body could not be read for logging.
    #[error("could not read the response body")]
    InvalidResponseBody,

    /// The request did not carry a valid session.
    #[error("not authenticated")]
    Unauthenticated,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidForeignKey,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::AlreadyPaid
            | Error::NotPaid
            | Error::LinkedToBillPayment
            | Error::DuplicateName(_) => StatusCode::CONFLICT,
            Error::InvalidPeriod(_)
            | Error::InvalidFrequency(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidBankKind(_)
            | Error::InvalidPaymentStatus(_)
            | Error::InvalidBillingDay(_)
            | Error::MissingBillingConfig
            | Error::UnexpectedBillingConfig
            | Error::NotACreditCard
            | Error::EmptyName
            | Error::NonPositiveAmount(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidForeignKey
            | Error::InvalidRequestBody => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidTimezoneError(_)
            | Error::InvalidResponseBody
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
