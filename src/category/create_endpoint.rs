//! The endpoint for adding a category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::html;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    category::{
        DEFAULT_NEW_CATEGORY_COLOR, DEFAULT_NEW_CATEGORY_ICON, categories_page::category_manager_view,
        create_category, list_categories,
    },
};

/// The state needed for adding a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a new category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    /// The category name.
    pub name: String,
    /// The icon, falls back to the default icon when empty.
    #[serde(default)]
    pub icon: String,
    /// The colour, falls back to the default colour when empty.
    #[serde(default)]
    pub color: String,
}

/// Add a category and respond with the refreshed category list and a notice.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let icon = non_empty_or(&form.icon, DEFAULT_NEW_CATEGORY_ICON);
    let color = non_empty_or(&form.color, DEFAULT_NEW_CATEGORY_COLOR);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let category = match create_category(&form.name, color, icon, &connection) {
        Ok(category) => category,
        Err(error @ Error::InvalidCategory(_)) => {
            tracing::debug!("Rejected new category: {error}");
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("Added category {}", category.name);

    let categories = match list_categories(&connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Could not list categories: {error}");
            return error.into_alert_response();
        }
    };

    let alert = Alert::SuccessSimple {
        message: "Category added".to_owned(),
    };

    html!(
        (category_manager_view(&categories))
        (alert.into_html())
    )
    .into_response()
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{
            CategoryForm, CreateCategoryState, create_category_endpoint, create_category_table,
            list_categories, seed_default_categories,
        },
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    fn get_test_state() -> CreateCategoryState {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).unwrap();
        seed_default_categories(&connection).unwrap();

        CreateCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn alert_text(html: &scraper::Html) -> String {
        let selector = Selector::parse("#alert-container p.font-semibold").unwrap();
        html.select(&selector)
            .next()
            .expect("no alert message")
            .text()
            .collect()
    }

    #[tokio::test]
    async fn adds_category_and_returns_list() {
        let state = get_test_state();
        let form = CategoryForm {
            name: "Gifts".to_owned(),
            icon: "🎁".to_owned(),
            color: "#123456".to_owned(),
        };

        let response = create_category_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(alert_text(&html), "Category added");
        let selector = Selector::parse("li[data-category-name='Gifts']").unwrap();
        assert!(html.select(&selector).next().is_some());

        let categories = list_categories(&state.db_connection.lock().unwrap()).unwrap();
        let gifts = categories.last().unwrap();
        assert_eq!(gifts.name, "Gifts");
        assert_eq!(gifts.icon, "🎁");
        assert_eq!(gifts.color, "#123456");
    }

    #[tokio::test]
    async fn empty_icon_and_colour_use_defaults() {
        let state = get_test_state();
        let form = CategoryForm {
            name: "Gifts".to_owned(),
            icon: String::new(),
            color: String::new(),
        };

        create_category_endpoint(State(state.clone()), Form(form)).await;

        let categories = list_categories(&state.db_connection.lock().unwrap()).unwrap();
        let gifts = categories.last().unwrap();
        assert_eq!(gifts.icon, "🏷️");
        assert_eq!(gifts.color, "#A3A3A3");
    }

    #[tokio::test]
    async fn duplicate_name_shows_alert() {
        let state = get_test_state();
        let form = CategoryForm {
            name: "FOOD".to_owned(),
            icon: "🍕".to_owned(),
            color: "#000000".to_owned(),
        };

        let response = create_category_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_eq!(alert_text(&html), "Category exists or invalid");
    }
}
