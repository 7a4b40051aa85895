//! Log-out route handler that invalidates authentication cookies and redirects users.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    auth::{UserID, invalidate_auth_cookie},
    endpoints,
    transaction::TransactionFeed,
};

/// The state needed to log out a user.
#[derive(Debug, Clone)]
pub struct LogOutState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The snapshots of the user's transactions which are dropped on log out.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Invalidate the auth cookie, stop streaming the user's transactions and
/// redirect the client to the log-in page.
pub async fn get_log_out(
    State(state): State<LogOutState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    state.transaction_feed.forget(user_id);
    tracing::info!("User {user_id} logged out");

    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, set_auth_cookie},
        endpoints,
        transaction::{TransactionFeed, create_transaction_table},
    };

    use super::{LogOutState, get_log_out};

    fn get_state() -> LogOutState {
        LogOutState {
            cookie_key: create_cookie_key("42"),
            transaction_feed: Arc::new(TransactionFeed::new()),
        }
    }

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie_and_redirects() {
        let state = get_state();
        let user_id = UserID::new(123);
        let jar = set_auth_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            user_id,
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let response = get_log_out(State(state), Extension(user_id), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
    }

    #[tokio::test]
    async fn log_out_ends_transaction_subscriptions() {
        let state = get_state();
        let user_id = UserID::new(123);
        let connection = Connection::open_in_memory().unwrap();
        create_transaction_table(&connection).unwrap();
        let mut receiver = state
            .transaction_feed
            .subscribe(user_id, &connection)
            .unwrap();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        // Held so that only the log out can close the subscription.
        let _feed = state.transaction_feed.clone();

        get_log_out(State(state), Extension(user_id), jar).await;

        assert!(
            receiver.changed().await.is_err(),
            "want subscription to close after log out"
        );
    }

    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    fn assert_cookie_expired(response: &Response<Body>) {
        let mut found_token_cookie = false;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != COOKIE_TOKEN {
                continue;
            }

            found_token_cookie = true;
            assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        assert!(found_token_cookie, "want token cookie to be overwritten");
    }
}
