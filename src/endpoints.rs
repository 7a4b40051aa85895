//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying, filtering and exporting a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing, adding and removing categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for the monthly budget and theme.
pub const SETTINGS_VIEW: &str = "/settings";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route that starts signing in with Google.
pub const PROVIDER_LOG_IN: &str = "/api/log_in/provider";
/// The route Google sends users back to after they sign in.
pub const PROVIDER_CALLBACK: &str = "/api/log_in/provider/callback";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The server-sent event stream that fires when the user's transactions change.
pub const TRANSACTION_EVENTS: &str = "/api/transactions/events";
/// The route to add categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to remove a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to save the user's settings.
pub const SETTINGS_API: &str = "/api/settings";
/// Download the filtered transactions as CSV.
pub const EXPORT_CSV: &str = "/api/export/csv";
/// Download all of the user's data as JSON.
pub const EXPORT_JSON: &str = "/api/export/json";
/// Download the filtered transactions as a PDF report.
pub const EXPORT_PDF: &str = "/api/export/pdf";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
