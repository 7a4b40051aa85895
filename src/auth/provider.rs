//! Sign in with a Google account using the OAuth 2.0 authorization code flow with PKCE.
//!
//! The flow has two legs:
//!
//! 1. [start_provider_sign_in] stores a random CSRF state and PKCE verifier with a
//!    ten minute expiry and sends the browser to Google's consent page.
//! 2. [complete_provider_sign_in] is the redirect target. It consumes the stored
//!    state, exchanges the code for an access token, reads the account's verified
//!    email address and logs in the user registered with that address, creating an
//!    account on first sign in.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{PasswordHash, User, ValidatedPassword, create_user, get_user_by_email, set_auth_cookie},
    endpoints,
};

/// How long a user has to finish signing in with Google.
pub const PROVIDER_STATE_LIFETIME: Duration = Duration::minutes(10);

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// The subset of Google's userinfo response needed to find the account.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    email: String,
    verified_email: Option<bool>,
}

/// The Google OAuth client registered for this server.
#[derive(Clone)]
pub struct GoogleSignIn {
    client: ConfiguredClient,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GoogleSignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSignIn").finish_non_exhaustive()
    }
}

impl GoogleSignIn {
    /// Create a client for the OAuth app with `client_id` and `client_secret`.
    ///
    /// `public_url` is the address users reach the server at, e.g.
    /// "https://spendwise.example.com". Google sends users back to the callback
    /// endpoint under it, so it must match the redirect URI registered with Google.
    ///
    /// # Errors
    /// Returns [Error::ProviderConfigError] if `public_url` does not form a valid
    /// redirect URL or the HTTP client cannot be built.
    pub fn new(client_id: &str, client_secret: &str, public_url: &str) -> Result<Self, Error> {
        let redirect_url = format!(
            "{}{}",
            public_url.trim_end_matches('/'),
            endpoints::PROVIDER_CALLBACK
        );

        let client = BasicClient::new(ClientId::new(client_id.to_owned()))
            .set_client_secret(ClientSecret::new(client_secret.to_owned()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_owned()).map_err(config_error)?)
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_owned()).map_err(config_error)?)
            .set_redirect_uri(RedirectUrl::new(redirect_url).map_err(config_error)?);

        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(config_error)?;

        Ok(Self {
            client,
            http_client,
        })
    }

    /// Build the consent page URL along with the state and verifier to store.
    fn authorize_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_owned()))
            .add_scope(Scope::new("email".to_owned()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (auth_url.to_string(), csrf_state, pkce_verifier)
    }

    /// Exchange `code` for an access token and get the account's email address.
    ///
    /// # Errors
    /// Returns [Error::ProviderSignInError] if Google rejects the code, the
    /// userinfo request fails or the email address has not been verified.
    async fn fetch_verified_email(
        &self,
        code: String,
        pkce_verifier: String,
    ) -> Result<EmailAddress, Error> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http_client)
            .await
            .map_err(|error| sign_in_error(format!("token exchange failed: {error}")))?;

        let google_user: GoogleUser = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| sign_in_error(format!("userinfo request failed: {error}")))?
            .json()
            .await
            .map_err(|error| sign_in_error(format!("invalid userinfo response: {error}")))?;

        if google_user.verified_email == Some(false) {
            return Err(sign_in_error(format!(
                "the email address {} has not been verified",
                google_user.email
            )));
        }

        google_user
            .email
            .parse()
            .map_err(|_| Error::InvalidEmail(google_user.email))
    }
}

fn config_error(error: impl std::fmt::Display) -> Error {
    Error::ProviderConfigError(error.to_string())
}

fn sign_in_error(reason: String) -> Error {
    Error::ProviderSignInError(reason)
}

/// Create the table for sign in attempts that have been sent to Google.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_provider_sign_in_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS provider_sign_in (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
        (),
    )?;

    Ok(())
}

/// Remember the CSRF `state` and PKCE verifier of a new sign in attempt.
///
/// Attempts that expired before `now` are removed at the same time.
fn save_sign_in_attempt(
    state: &str,
    pkce_verifier: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM provider_sign_in WHERE expires_at <= ?1",
        (now.unix_timestamp(),),
    )?;
    connection.execute(
        "INSERT INTO provider_sign_in (state, pkce_verifier, expires_at) VALUES (?1, ?2, ?3)",
        (
            state,
            pkce_verifier,
            (now + PROVIDER_STATE_LIFETIME).unix_timestamp(),
        ),
    )?;

    Ok(())
}

/// Remove the attempt with `state` and return its PKCE verifier.
///
/// Each state can be used once.
///
/// # Errors
/// Returns [Error::NotFound] if there is no attempt with `state` or it expired.
fn take_sign_in_attempt(
    state: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<String, Error> {
    connection
        .query_row(
            "DELETE FROM provider_sign_in WHERE state = ?1 AND expires_at > ?2
            RETURNING pkce_verifier",
            (state, now.unix_timestamp()),
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::NotFound)
}

/// Get the user registered with `email`, registering them if they are new.
///
/// New accounts get a random password that is never shown to anyone, so they
/// can only be accessed through Google.
///
/// # Errors
/// Returns an error if the user could not be read or created.
pub fn find_or_create_provider_user(
    email: EmailAddress,
    hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    match get_user_by_email(&email, connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            let random_password = CsrfToken::new_random();
            let password_hash = PasswordHash::new(
                ValidatedPassword::new_unchecked(random_password.secret()),
                hash_cost,
            )?;
            let user = create_user(email, password_hash, connection)?;
            tracing::info!("Registered user {} ({}) through Google", user.id, user.email);

            Ok(user)
        }
        Err(error) => Err(error),
    }
}

/// The state needed to sign in with Google.
#[derive(Debug, Clone)]
pub struct ProviderSignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for sign in attempts and users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The Google client, `None` if sign in with Google is not configured.
    pub identity_provider: Option<Arc<GoogleSignIn>>,
}

impl FromRef<AppState> for ProviderSignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
        }
    }
}

impl FromRef<ProviderSignInState> for Key {
    fn from_ref(state: &ProviderSignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Send the browser to Google's consent page.
///
/// Responds with the 404 page if sign in with Google is not configured.
pub async fn start_provider_sign_in(
    State(state): State<ProviderSignInState>,
) -> Result<Response, Error> {
    let provider = state.identity_provider.ok_or(Error::NotFound)?;
    let (auth_url, csrf_state, pkce_verifier) = provider.authorize_url();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    save_sign_in_attempt(
        csrf_state.secret(),
        pkce_verifier.secret(),
        OffsetDateTime::now_utc(),
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not save sign in attempt: {error}"))?;

    Ok(Redirect::to(&auth_url).into_response())
}

/// The query string Google sends users back with.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderCallbackQuery {
    /// The authorization code to exchange for an access token.
    pub code: Option<String>,
    /// The CSRF state from [start_provider_sign_in].
    pub state: Option<String>,
    /// Set instead of `code` when the user declined or Google refused.
    pub error: Option<String>,
}

/// Finish signing in with Google, log the user in and send them to the dashboard.
pub async fn complete_provider_sign_in(
    State(state): State<ProviderSignInState>,
    jar: PrivateCookieJar,
    Query(query): Query<ProviderCallbackQuery>,
) -> Result<Response, Error> {
    let provider = state.identity_provider.ok_or(Error::NotFound)?;

    if let Some(error) = query.error {
        tracing::info!("Google sign in was not completed: {error}");
        return Err(sign_in_error(error));
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return Err(sign_in_error("missing code or state".to_owned()));
    };

    let pkce_verifier = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match take_sign_in_attempt(&csrf_state, OffsetDateTime::now_utc(), &connection) {
            Ok(pkce_verifier) => pkce_verifier,
            Err(Error::NotFound) => {
                tracing::warn!("Rejected unknown or expired Google sign in state");
                return Err(sign_in_error("unknown or expired sign in attempt".to_owned()));
            }
            Err(error) => return Err(error),
        }
    };

    let email = provider
        .fetch_verified_email(code, pkce_verifier)
        .await
        .inspect_err(|error| tracing::error!("Google sign in failed: {error}"))?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        find_or_create_provider_user(email, PasswordHash::DEFAULT_COST, &connection)?
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("User {} logged in with Google", user.id);

    Ok((jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response())
}


#[cfg(test)]
mod provider_user_tests {
    use rusqlite::Connection;

    use crate::auth::{PasswordHash, count_users, create_user, create_user_table};

    use super::find_or_create_provider_user;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        connection
    }

    #[test]
    fn registers_new_email() {
        let connection = get_test_connection();

        let user =
            find_or_create_provider_user("new@example.com".parse().unwrap(), 4, &connection)
                .unwrap();

        assert_eq!(user.email.as_str(), "new@example.com");
        assert_eq!(count_users(&connection).unwrap(), 1);
        assert!(!user.password_hash.verify("").unwrap());
    }

    #[test]
    fn reuses_existing_account() {
        let connection = get_test_connection();
        let existing = create_user(
            "test@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let user =
            find_or_create_provider_user("test@example.com".parse().unwrap(), 4, &connection)
                .unwrap();

        assert_eq!(user.id, existing.id);
        assert_eq!(count_users(&connection).unwrap(), 1);
    }
}
