//! Accounts, passwords and the cookie-based sessions that keep users logged in.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod provider;
mod redirect;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use provider::{
    GoogleSignIn, complete_provider_sign_in, create_provider_sign_in_table,
    start_provider_sign_in,
};
pub use password::{PASSWORD_INPUT_MIN_LENGTH, PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub(crate) use token::Token;
pub use user::{
    User, UserID, count_users, create_user, create_user_table, get_user_by_email,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub(crate) use middleware::AuthState;
