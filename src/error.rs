//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The message shown when a transaction form fails validation.
pub const INVALID_TRANSACTION_MESSAGE: &str =
    "Please fill in Amount (positive), Category, and Date.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be encoded for the cookie.
    #[error("could not encode auth token: {0}")]
    TokenEncodingError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address already exists.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The transaction is missing a positive amount, a category or a date.
    #[error("{INVALID_TRANSACTION_MESSAGE}")]
    InvalidTransaction,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the transaction snapshots
    #[error("could not acquire the transaction feed lock")]
    FeedLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// The category name is empty or already taken, ignoring case.
    #[error("the category \"{0}\" already exists or is invalid")]
    InvalidCategory(String),

    /// Tried to remove the category that income is filed under.
    #[error("the Income category cannot be removed")]
    ProtectedCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// The export would not contain any transactions.
    #[error("there are no transactions to export")]
    NothingToExport,

    /// The PDF document could not be rendered.
    #[error("could not render PDF: {0}")]
    PdfExportError(String),

    /// The settings for signing in with Google are invalid.
    #[error("invalid Google sign in settings: {0}")]
    ProviderConfigError(String),

    /// Signing in with Google was declined, expired or rejected by Google.
    #[error("Google sign in failed: {0}")]
    ProviderSignInError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::NothingToExport => (
                StatusCode::BAD_REQUEST,
                InternalServerError {
                    description: "Nothing to export",
                    fix: "No data to export. Add some transactions or change the filters.",
                }
                .into_html(),
            )
                .into_response(),
            Error::ProviderSignInError(_) => (
                StatusCode::BAD_REQUEST,
                InternalServerError {
                    description: "Google sign in failed",
                    fix: "Go back to the log in page and try again.",
                }
                .into_html(),
            )
                .into_response(),
            Error::PdfExportError(_) => InternalServerError {
                description: "PDF export failed",
                fix: "The PDF could not be created. Try again later or check the server logs.",
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidTransaction => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Error saving transaction".to_owned(),
                    details: INVALID_TRANSACTION_MESSAGE.to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Error saving transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Delete failed".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidCategory(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Category exists or invalid".to_owned(),
                    details: format!(
                        "Could not add the category \"{name}\". \
                        Choose a name that is not empty and not already in use."
                    ),
                },
            ),
            Error::ProtectedCategory => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Cannot remove default Income category".to_owned(),
                    details: "Income transactions are always filed under this category."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not remove category".to_owned(),
                    details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been removed."
                        .to_owned(),
                },
            ),
            Error::NothingToExport => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Nothing to export".to_owned(),
                    details: "No data to export. Add some transactions or change the filters."
                        .to_owned(),
                },
            ),
            Error::PdfExportError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "PDF export failed".to_owned(),
                    details: "The PDF could not be created. Check the server logs for more details."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[tokio::test]
    async fn protected_category_alert_has_message() {
        let response = Error::ProtectedCategory.into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Cannot remove default Income category"));
    }

    #[tokio::test]
    async fn nothing_to_export_page_is_bad_request() {
        let response = Error::NothingToExport.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unexpected_errors_are_hidden_from_the_client() {
        let response = Error::HashingError("secret details".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Something went wrong"));
        assert!(!text.contains("secret details"));
    }
}
