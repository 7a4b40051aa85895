//! Transient notices shown at the bottom of the page after an htmx request.
//!
//! Alerts replace the `#alert-container` element from [crate::html::base]
//! with an out-of-band swap, so they work regardless of the request's target.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error notice.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with an explanation underneath.
    Success { message: String, details: String },
    /// A success message on its own, e.g. "Settings saved".
    SuccessSimple { message: String },
    /// An error message with an explanation of what to do about it.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an out-of-band replacement for the alert container.
    pub fn into_html(self) -> Markup {
        let (message, details, is_error) = match self {
            Alert::Success { message, details } => (message, Some(details), false),
            Alert::SuccessSimple { message } => (message, None, false),
            Alert::Error { message, details } => (message, Some(details), true),
        };

        let alert_style = if is_error {
            "flex items-start gap-3 p-4 rounded-lg shadow text-red-800 bg-red-50 \
            border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start gap-3 p-4 rounded-lg shadow text-green-800 bg-green-50 \
            border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class=(alert_style)
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty())
                        {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = match self {
            Alert::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        };

        (status_code, self.into_html()).into_response()
    }
}
