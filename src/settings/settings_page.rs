//! The settings page and the endpoint that saves it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, dollar_input_styles,
    },
    navigation::NavBar,
    settings::{Settings, SettingsPatch, get_settings, save_settings},
};

/// The state needed to read and save settings.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The database connection for the settings table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_settings(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get settings for user {user_id}: {error}"))?;

    Ok(settings_view(&settings).into_response())
}

/// The form data for the settings page.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    /// The monthly budget as typed by the user.
    pub budget: String,
}

/// Parse a budget typed by the user, anything that is not a finite number is zero.
fn parse_budget(raw_budget: &str) -> f64 {
    raw_budget
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|budget| budget.is_finite())
        .unwrap_or(0.0)
}

/// Merge the submitted budget into the user's settings.
pub async fn save_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let patch = SettingsPatch {
        theme: None,
        budget: Some(parse_budget(&form.budget)),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match save_settings(user_id, patch, &connection) {
        Ok(settings) => {
            tracing::info!("Saved settings for user {user_id}: {settings:?}");

            Alert::SuccessSimple {
                message: "Settings saved".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not save settings for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn settings_view(settings: &Settings) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Settings" }

                div class=(CARD_STYLE)
                {
                    form
                        hx-post=(endpoints::SETTINGS_API)
                        hx-swap="none"
                        hx-target-error="#alert-container"
                        class="space-y-4"
                    {
                        div
                        {
                            label for="budget" class=(FORM_LABEL_STYLE) { "Monthly Budget" }

                            div class="input-wrapper"
                            {
                                input
                                    id="budget"
                                    type="number"
                                    name="budget"
                                    step="0.01"
                                    value=(settings.budget)
                                    required
                                    class=(FORM_TEXT_INPUT_STYLE);
                            }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                    }
                }
            }
        }
    );

    base("Settings", &[dollar_input_styles()], &content)
}
