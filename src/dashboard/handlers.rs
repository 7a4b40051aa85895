//! Dashboard route handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, list_categories},
    dashboard::{
        cards::{budget_card, summary_cards},
        charts::{
            DashboardChart, charts_script, echarts_script, expense_pie_chart, monthly_bar_chart,
        },
    },
    endpoints,
    engine::{MonthBucket, RangeKind, Summary, budget_progress, monthly_series, select_range, summarize},
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, link, live_content},
    navigation::NavBar,
    settings::{Settings, get_settings},
    timezone::local_today,
    transaction::TransactionFeed,
};

/// How many months the income and expense chart covers, ending with the current month.
const CHART_MONTHS: usize = 6;

const RANGE_LINK_STYLE: &str = "px-4 py-2 text-sm font-medium border border-gray-200 \
    dark:border-gray-700 first:rounded-s-lg last:rounded-e-lg";
const RANGE_SELECTED_STYLE: &str = "bg-blue-600 text-white";
const RANGE_UNSELECTED_STYLE: &str = "bg-white text-gray-900 hover:bg-gray-100 \
    dark:bg-gray-800 dark:text-white dark:hover:bg-gray-700";

const EXPENSE_PIE_CHART_ID: &str = "expense-pie-chart";
const MONTHLY_BAR_CHART_ID: &str = "monthly-bar-chart";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading settings and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The source of the user's transactions.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// The query string of the dashboard, e.g. `?range=year`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The time window to summarise, the current month if missing or unknown.
    #[serde(default)]
    pub range: RangeKind,
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    range: RangeKind,
    summary: Summary,
    settings: Settings,
    budget_percentage: f64,
    months: Vec<MonthBucket>,
    categories: Vec<Category>,
}

/// Display a page with totals, the budget and charts for the selected range.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let (snapshot, settings, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let snapshot = state
            .transaction_feed
            .snapshot(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
        let settings = get_settings(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve settings: {error}"))?;
        let categories = list_categories(&connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

        (snapshot, settings, categories)
    };

    let in_range = select_range(&snapshot, query.range, today);
    let summary = summarize(&in_range);
    let budget_percentage = budget_progress(summary.total_expenses, settings.budget);
    let months = monthly_series(&snapshot, CHART_MONTHS, today);

    let data = DashboardData {
        range: query.range,
        summary,
        settings,
        budget_percentage,
        months,
        categories,
    };

    Ok(dashboard_view(&data).into_response())
}

fn dashboard_url(range: RangeKind) -> String {
    format!("{}?range={}", endpoints::DASHBOARD_VIEW, range.as_query_value())
}

fn range_selector(selected: RangeKind) -> Markup {
    html! {
        div
            id="range-selector"
            class="inline-flex rounded-md shadow-xs mb-4"
            role="group"
        {
            @for range in RangeKind::ALL {
                @let is_selected = range == selected;
                @let colors = if is_selected {
                    RANGE_SELECTED_STYLE
                } else {
                    RANGE_UNSELECTED_STYLE
                };

                a
                    href=(dashboard_url(range))
                    aria-current=[is_selected.then_some("page")]
                    class={ (RANGE_LINK_STYLE) " " (colors) }
                {
                    (range.label())
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let has_expenses = !data.summary.expense_by_category.is_empty();

    let pie_chart = has_expenses.then(|| DashboardChart {
        id: EXPENSE_PIE_CHART_ID,
        options: expense_pie_chart(&data.summary.expense_by_category, &data.categories)
            .to_string(),
    });
    let bar_chart = DashboardChart {
        id: MONTHLY_BAR_CHART_ID,
        options: monthly_bar_chart(&data.months).to_string(),
    };

    let pie_container = pie_chart.as_ref().map(DashboardChart::container);
    let bar_container = bar_chart.container();
    let charts: Vec<DashboardChart> = pie_chart.into_iter().chain([bar_chart]).collect();

    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "Add a transaction");

    let content = html! {
        div class="w-full max-w-screen-xl space-y-4"
        {
            (summary_cards(&data.summary))

            (budget_card(data.summary.total_expenses, data.settings.budget, data.budget_percentage))

            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                div class=(CARD_STYLE)
                {
                    @if let Some(pie_container) = pie_container {
                        (pie_container)
                    } @else {
                        div
                            id="no-expense-data"
                            class="flex flex-col items-center justify-center min-h-[320px] gap-2"
                        {
                            p class="text-gray-500 dark:text-gray-400" { "No data for this period." }
                            p { (new_transaction_link) }
                        }
                    }
                }

                div class=(CARD_STYLE)
                {
                    (bar_container)
                }
            }

            (charts_script(&charts))
        }
    };

    let page = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (range_selector(data.range))

            (live_content(&dashboard_url(data.range), &content))
        }
    };

    base("Dashboard", &[echarts_script()], &page)
}
