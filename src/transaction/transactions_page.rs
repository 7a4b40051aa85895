//! Defines the route handler for the page that lists, filters and exports transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, category_style, list_categories},
    endpoints::{self, format_endpoint},
    engine::{ALL_CATEGORIES, SortKey},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency, live_content,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionFeed, TransactionKind, query::TransactionListQuery},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading categories and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The latest transactions of each user.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// Render the user's transactions filtered and sorted by the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Response, Error> {
    let (snapshot, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let snapshot = state
            .transaction_feed
            .snapshot(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
        let categories = list_categories(&connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

        (snapshot, categories)
    };

    let transactions = query.apply(&snapshot);

    Ok(transactions_view(&transactions, &categories, &query).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    categories: &[Category],
    query: &TransactionListQuery,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let current_url = query.url_for(endpoints::TRANSACTIONS_VIEW);

    let list = html! {
        (export_buttons(query))

        @if transactions.is_empty() {
            div class="text-center py-10 text-gray-500 dark:text-gray-400"
            {
                p class="font-semibold" { "No transactions found." }
            }
        } @else {
            ul class="space-y-3" data-transaction-list
            {
                @for transaction in transactions {
                    (transaction_row(transaction, categories))
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class={ "w-full max-w-4xl space-y-4 " (CARD_STYLE) }
            {
                div class="flex flex-wrap items-center justify-between gap-4"
                {
                    h1 class="text-2xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (filter_form(categories, query))

                (live_content(&current_url, &list))
            }
        }
    };

    base("Transactions", &[], &content)
}

/// The search box and the category and sort selects.
///
/// Changing any of them reloads the list with the new query string.
fn filter_form(categories: &[Category], query: &TransactionListQuery) -> Markup {
    let selected_category = query.category_filter();
    let selected_sort = query.sort_key();

    html! {
        form
            id="transaction-filters"
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            hx-get=(endpoints::TRANSACTIONS_VIEW)
            hx-trigger="change, input changed delay:300ms from:#search"
            hx-target="#live-content"
            hx-select="#live-content"
            hx-swap="outerHTML"
            hx-push-url="true"
            class="flex flex-wrap gap-2"
        {
            input
                id="search"
                type="search"
                name="search"
                placeholder="Search..."
                value=(query.search)
                class={ "flex-grow md:flex-grow-0 md:w-64 " (FORM_TEXT_INPUT_STYLE) };

            select name="category" aria-label="Category" class={ "w-auto " (FORM_TEXT_INPUT_STYLE) }
            {
                option
                    value=(ALL_CATEGORIES)
                    selected[selected_category.as_query_value() == ALL_CATEGORIES]
                {
                    "All Categories"
                }

                @for category in categories {
                    option
                        value=(category.name)
                        selected[selected_category.as_query_value() == category.name]
                    {
                        (category.name)
                    }
                }
            }

            select name="sort" aria-label="Sort by" class={ "w-auto " (FORM_TEXT_INPUT_STYLE) }
            {
                @for sort_key in SortKey::ALL {
                    option
                        value=(sort_key.as_query_value())
                        selected[selected_sort == Some(sort_key)]
                    {
                        (sort_key.label())
                    }
                }
            }
        }
    }
}

/// Buttons that download the filtered list.
///
/// The export endpoints check that there is something to export and then
/// redirect the browser to the download.
fn export_buttons(query: &TransactionListQuery) -> Markup {
    let exports = [
        ("CSV", endpoints::EXPORT_CSV),
        ("PDF", endpoints::EXPORT_PDF),
        ("JSON", endpoints::EXPORT_JSON),
    ];

    html! {
        div class="flex gap-2" data-export-buttons
        {
            @for (label, endpoint) in exports {
                button
                    type="button"
                    hx-get=(query.url_for(endpoint))
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "⬇ " (label)
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction, categories: &[Category]) -> Markup {
    let is_income = transaction.kind == TransactionKind::Income;
    let style = category_style(&transaction.category, categories);
    let title = if transaction.description.is_empty() {
        style.name.as_str()
    } else {
        transaction.description.as_str()
    };
    let (sign, amount_class) = if is_income {
        ("+", "text-green-500 dark:text-green-400")
    } else {
        ("-", "text-red-500 dark:text-red-400")
    };
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html! {
        li
            class="flex items-center justify-between p-4 rounded-xl shadow-sm bg-white dark:bg-gray-800"
            data-transaction-id=(transaction.id)
        {
            div class="flex items-center gap-4"
            {
                div
                    class="w-12 h-12 rounded-full flex items-center justify-center text-xl"
                    style={ "background-color: " (style.color) ";" }
                    title=(style.name)
                {
                    (style.icon)
                }

                div
                {
                    p class="font-bold" data-transaction-title
                    {
                        (title)

                        @if transaction.recurring {
                            span class="ml-2 inline-block text-xs px-2 py-1 bg-indigo-100 text-indigo-700 rounded-full"
                            {
                                "Recurring"
                            }
                        }
                    }

                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        time datetime=(transaction.date) { (transaction.date) }
                    }
                }
            }

            div class="flex items-center gap-4"
            {
                p class={ "font-bold text-lg tabular-nums " (amount_class) }
                {
                    (sign) (format_currency(transaction.amount))
                }

                div class="flex gap-3 text-sm"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm="Delete this transaction?"
                        hx-target="closest li"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                        class="text-red-600 hover:text-red-500 dark:text-red-500 dark:hover:text-red-400"
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}
