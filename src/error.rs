//! Defines the app level error type and the conversion to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field is missing or fails a format constraint. The client
    /// should fix the request body and try again.
    #[error("{0}")]
    Validation(String),

    /// The client provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// A resource submitted for creation already carries an identity.
    /// Creation assigns identities on the server, so this is a client error.
    #[error("identity must not be set when adding a resource")]
    IdentityAssigned,

    /// A query was given an invalid foreign key. The client should check that
    /// the referenced ids exist.
    #[error("a referenced resource id is invalid")]
    InvalidForeignKey,

    /// The user provided an invalid combination of username, email, and
    /// password.
    #[error("invalid username, email, or password")]
    InvalidCredentials,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The username used to sign up is already taken.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The email address used to sign up is already in use.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// A row could not be read back directly after it was written.
    ///
    /// The write and the read happen within a single lock scope, so this must
    /// never occur. It is logged and surfaced as an internal error, never
    /// retried.
    #[error("internal consistency violation: {0}")]
    Inconsistent(String),

    /// An unexpected error occurred in the underlying hashing library.
    ///
    /// The error string should only be logged on the server, never sent to
    /// the client.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email_id") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl Error {
    /// The HTTP status code each error maps to at the REST boundary.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::TooWeak(_)
            | Error::IdentityAssigned
            | Error::InvalidForeignKey => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateUsername | Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::Inconsistent(_) | Error::HashingError(_) | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    /// Map the error to a status code and a JSON body, keeping the message
    /// intact so diagnostics survive the boundary.
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {self}");

            // Internal details are not intended for the client.
            return (
                status_code,
                Json(json!({"error": "internal server error"})),
            )
                .into_response();
        }

        (status_code, Json(json!({"error": self.to_string()}))).into_response()
    }
}
