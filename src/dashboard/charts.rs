//! ECharts options for the dashboard charts and the script that draws them.
//!
//! The script is placed inline after the chart containers so that the charts
//! are drawn again whenever the live content is swapped in.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    category::{Category, CategoryStyle, category_style},
    engine::{CategoryTotal, MonthBucket},
    html::HeadElement,
};

/// The ECharts build loaded by the dashboard.
const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";

const EXPENSE_COLOR: &str = "#EF4444";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl DashboardChart {
    /// The empty element the chart is drawn into.
    pub fn container(&self) -> Markup {
        html! {
            div id=(self.id) class="min-h-[320px] w-full rounded dark:bg-gray-100" {}
        }
    }
}

/// The script tag that loads ECharts.
pub(super) fn echarts_script() -> HeadElement {
    HeadElement::ScriptLink(ECHARTS_URL.to_owned())
}

/// A script that draws `charts` into their containers.
///
/// Must be placed after the containers.
pub(super) fn charts_script(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) return;
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html! {
        script { (PreEscaped(script_content)) }
    }
}

/// A pie chart of expenses per category, coloured by category.
///
/// Categories that no longer exist are drawn with the fallback colour.
pub(super) fn expense_pie_chart(
    expense_by_category: &[CategoryTotal],
    categories: &[Category],
) -> Chart {
    let styles: Vec<CategoryStyle> = expense_by_category
        .iter()
        .map(|total| category_style(&total.category, categories))
        .collect();
    let colors: Vec<Color> = styles
        .iter()
        .map(|style| Color::from(style.color.as_str()))
        .collect();
    let data: Vec<(f64, &str)> = expense_by_category
        .iter()
        .map(|total| (total.amount, total.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0%"))
        .color(colors)
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

/// A bar chart comparing income and expenses for each month in `months`.
pub(super) fn monthly_bar_chart(months: &[MonthBucket]) -> Chart {
    let labels: Vec<String> = months
        .iter()
        .map(|bucket| format!("{} {}", bucket.label, bucket.year))
        .collect();
    let income: Vec<f64> = months.iter().map(|bucket| bucket.income).collect();
    let expenses: Vec<f64> = months.iter().map(|bucket| bucket.expenses).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses")
                .subtext("Last six months"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(CategoryStyle::income().color.as_str()))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(expenses),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
