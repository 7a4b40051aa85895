//! Summary cards for the totals of the selected range and the budget.

use maud::{Markup, html};

use crate::{
    engine::Summary,
    html::{CARD_STYLE, format_currency},
};

/// The income, expense and net balance cards.
pub(super) fn summary_cards(summary: &Summary) -> Markup {
    let net_color = if summary.net_balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        div class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full"
        {
            (card(
                "total-income",
                "Total Income",
                summary.total_income,
                "text-green-600 dark:text-green-400",
            ))
            (card(
                "total-expenses",
                "Total Expenses",
                summary.total_expenses,
                "text-red-600 dark:text-red-400",
            ))
            (card("net-balance", "Net Balance", summary.net_balance, net_color))
        }
    }
}

fn card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p data-amount class={ "text-2xl font-bold " (amount_style) }
            {
                (format_currency(amount))
            }
        }
    }
}

/// A progress bar showing how much of `budget` has been spent.
///
/// `percentage` may exceed 100, the bar is capped at full width while the
/// label shows the actual figure.
pub(super) fn budget_card(total_expenses: f64, budget: f64, percentage: f64) -> Markup {
    let width = percentage.clamp(0.0, 100.0);
    let bar_color = if percentage > 100.0 {
        "bg-red-600"
    } else if percentage >= 80.0 {
        "bg-yellow-400"
    } else {
        "bg-blue-600"
    };

    html! {
        div id="budget-progress" class={ (CARD_STYLE) " w-full" }
        {
            div class="flex justify-between items-baseline mb-2"
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400"
                {
                    "Monthly Budget"
                }

                span data-budget-label class="text-sm font-semibold"
                {
                    (format!("{percentage:.0}%"))
                }
            }

            div class="w-full h-3 bg-gray-200 rounded-full dark:bg-gray-700"
            {
                div
                    data-budget-bar
                    class={ "h-3 rounded-full " (bar_color) }
                    style=(format!("width: {width:.0}%"))
                {}
            }

            p class="mt-2 text-sm text-gray-600 dark:text-gray-400"
            {
                (format_currency(total_expenses)) " of " (format_currency(budget)) " spent"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::engine::Summary;

    use super::{budget_card, summary_cards};

    fn text_of(document: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no element matching {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn shows_totals() {
        let summary = Summary {
            total_income: 500.0,
            total_expenses: 40.0,
            net_balance: 460.0,
            expense_by_category: Vec::new(),
        };

        let document = Html::parse_fragment(&summary_cards(&summary).into_string());

        assert_eq!(text_of(&document, "#total-income [data-amount]"), "$500.00");
        assert_eq!(text_of(&document, "#total-expenses [data-amount]"), "$40.00");
        assert_eq!(text_of(&document, "#net-balance [data-amount]"), "$460.00");
    }

    #[test]
    fn over_budget_bar_is_full_width_with_real_label() {
        let document = Html::parse_fragment(&budget_card(120.0, 100.0, 120.0).into_string());

        assert_eq!(text_of(&document, "[data-budget-label]"), "120%");
        let selector = Selector::parse("[data-budget-bar]").unwrap();
        let bar = document.select(&selector).next().unwrap();
        assert_eq!(bar.value().attr("style"), Some("width: 100%"));
    }

    #[test]
    fn partial_budget_bar() {
        let document = Html::parse_fragment(&budget_card(25.0, 100.0, 25.0).into_string());

        assert_eq!(text_of(&document, "[data-budget-label]"), "25%");
        let selector = Selector::parse("[data-budget-bar]").unwrap();
        let bar = document.select(&selector).next().unwrap();
        assert_eq!(bar.value().attr("style"), Some("width: 25%"));
    }
}
