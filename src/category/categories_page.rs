//! The page for listing, adding and removing categories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{
        Category, DEFAULT_NEW_CATEGORY_COLOR, DEFAULT_NEW_CATEGORY_ICON, list_categories,
    },
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    transaction::INCOME_CATEGORY,
};

/// The ID of the form and list that are replaced after a category is added.
const CATEGORY_MANAGER_ID: &str = "category-manager";
const CATEGORY_LIST_ID: &str = "category-list";

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = list_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Categories" }

                (category_manager_view(categories))
            }
        }
    );

    base("Categories", &[], &content)
}

/// The add form and the list of categories.
///
/// Replaced as a whole after a category is added so the form is cleared.
pub(super) fn category_manager_view(categories: &[Category]) -> Markup {
    html!(
        div id=(CATEGORY_MANAGER_ID) class="space-y-6"
        {
            div class=(CARD_STYLE)
            {
                (new_category_form())
            }

            div class=(CARD_STYLE)
            {
                h2 class="text-sm font-semibold mb-2" { "Existing" }

                (category_list_view(categories))
            }
        }
    )
}

fn new_category_form() -> Markup {
    html!(
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target={ "#" (CATEGORY_MANAGER_ID) }
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="space-y-4"
        {
            div class="grid grid-cols-1 md:grid-cols-3 gap-3"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Category name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                    input
                        id="icon"
                        type="text"
                        name="icon"
                        placeholder="Icon (emoji)"
                        value=(DEFAULT_NEW_CATEGORY_ICON)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Colour" }

                    input
                        id="color"
                        type="color"
                        name="color"
                        title="Pick colour"
                        value=(DEFAULT_NEW_CATEGORY_COLOR)
                        required
                        class="w-full h-10 rounded border border-gray-300 dark:border-gray-600";
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    )
}

/// The list of categories with a delete button for each removable category.
fn category_list_view(categories: &[Category]) -> Markup {
    html!(
        ul id=(CATEGORY_LIST_ID) class="space-y-2"
        {
            @for category in categories {
                @let delete_url = endpoints::format_endpoint(endpoints::CATEGORY, category.id);
                @let is_protected = category.name == INCOME_CATEGORY;

                li
                    class="flex items-center justify-between p-3 rounded-lg bg-gray-50 dark:bg-gray-700"
                    data-category-name=(category.name)
                {
                    div class="flex items-center gap-3"
                    {
                        div
                            class="w-8 h-8 rounded-full flex items-center justify-center"
                            style={ "background-color: " (category.color) ";" }
                        {
                            (category.icon)
                        }

                        div
                        {
                            div class="font-semibold" { (category.name) }
                            div class="text-xs text-gray-500 dark:text-gray-400" { (category.color) }
                        }
                    }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm={
                            "Delete category \"" (category.name)
                            "\"? Existing transactions keep their category value."
                        }
                        hx-target="closest li"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                        disabled[is_protected]
                        class={ (BUTTON_DELETE_STYLE) " disabled:opacity-50 disabled:cursor-not-allowed" }
                    {
                        "Delete"
                    }
                }
            }

            @if categories.is_empty() {
                li class="px-3 py-4 text-center text-sm text-gray-500 dark:text-gray-400"
                {
                    "No categories yet."
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{
            CategoriesPageState, DEFAULT_CATEGORIES, create_category, create_category_table,
            get_categories_page, seed_default_categories,
        },
        endpoints,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    fn get_test_state() -> CategoriesPageState {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).unwrap();
        seed_default_categories(&connection).unwrap();

        CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_form_with_defaults() {
        let response = get_categories_page(State(get_test_state())).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CATEGORIES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input_with_value(&form, "icon", "text", "🏷️");
        assert_form_input_with_value(&form, "color", "color", "#A3A3A3");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn lists_categories_with_delete_buttons() {
        let response = get_categories_page(State(get_test_state())).await.unwrap();

        let html = parse_html_document(response).await;
        let item_selector = Selector::parse("#category-list li[data-category-name]").unwrap();
        let names: Vec<&str> = html
            .select(&item_selector)
            .filter_map(|item| item.value().attr("data-category-name"))
            .collect();
        let want: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, want);

        let button_selector = Selector::parse("#category-list button[hx-delete]").unwrap();
        let first_button = html.select(&button_selector).next().unwrap();
        assert_eq!(
            first_button.value().attr("hx-delete"),
            Some(endpoints::format_endpoint(endpoints::CATEGORY, 1).as_str())
        );
        assert!(first_button.value().attr("disabled").is_none());
    }

    #[tokio::test]
    async fn income_category_cannot_be_deleted_from_page() {
        let state = get_test_state();
        create_category("Income", "#22C55E", "💰", &state.db_connection.lock().unwrap()).unwrap();

        let response = get_categories_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        let selector =
            Selector::parse("li[data-category-name='Income'] button[hx-delete]").unwrap();
        let button = html.select(&selector).next().unwrap();
        assert!(button.value().attr("disabled").is_some());
    }
}
