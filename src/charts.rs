//! ECharts options for the report screens and the markup that mounts them.
//!
//! Chart options are built with charming and serialized to JSON. The script
//! that initializes the charts is rendered inline after the chart containers,
//! so it runs both on a full page load and when htmx swaps in new content.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::report::{CashFlowSeries, ComparisonSeries, GroupEntry, PeriodKind};

/// A chart with its HTML container ID and ECharts configuration.
pub struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl ReportChart {
    pub fn new(id: &'static str, chart: Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Renders the chart containers followed by the script that fills them.
pub fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }

            script { (charts_script(charts)) }
        }
    )
}

fn charts_script(charts: &[ReportChart]) -> PreEscaped<String> {
    let script = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    echarts.getInstanceByDom(chartDom)?.dispose();
                    const chart = echarts.init(chartDom);
                    chart.setOption({});

                    window.addEventListener('resize', () => chart.resize());

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }};
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(script)
}

/// Revenue per bucket for the current window drawn over the previous one.
pub fn comparison_chart(
    title: &str,
    series: &ComparisonSeries,
    period: PeriodKind,
) -> Chart {
    Chart::new()
        .title(Title::new().text(title).subtext(period.label()))
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
        .grid(default_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(currency_axis())
        .series(
            Line::new()
                .name("Current")
                .smooth(true)
                .data(series.current.clone()),
        )
        .series(
            Line::new()
                .name(period.comparison_label())
                .smooth(true)
                .item_style(ItemStyle::new().color("#9ca3af"))
                .data(series.previous.clone()),
        )
}

/// A ring chart of the share each group contributes.
pub fn breakdown_chart(title: &str, entries: &[GroupEntry]) -> Chart {
    let data: Vec<(f64, String)> = entries
        .iter()
        .map(|entry| (entry.amount, entry.label.clone()))
        .collect();

    Chart::new()
        .title(Title::new().text(title))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("2%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["40%", "65%"])
                .item_style(ItemStyle::new().border_radius(4))
                .data(data),
        )
}

/// Income and expense per bucket side by side.
pub fn cash_flow_chart(cash_flow: &CashFlowSeries, period: PeriodKind) -> Chart {
    Chart::new()
        .title(Title::new().text("Cash Flow").subtext(period.label()))
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
        .grid(default_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(cash_flow.labels.clone()),
        )
        .y_axis(currency_axis())
        .series(
            Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color("#16a34a"))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(cash_flow.income.clone()),
        )
        .series(
            Bar::new()
                .name("Expense")
                .item_style(ItemStyle::new().color("#dc2626"))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(cash_flow.expense.clone()),
        )
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .top(70)
        .contain_label(true)
}

fn currency_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter()))
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

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::report::{ComparisonSeries, GroupEntry, PeriodKind};

    use super::{ReportChart, breakdown_chart, charts_view, comparison_chart};

    #[test]
    fn comparison_chart_has_both_series() {
        let series = ComparisonSeries {
            labels: vec!["1".to_owned(), "2".to_owned()],
            current: vec![10.0, 20.0],
            previous: vec![5.0, 0.0],
        };

        let options = comparison_chart("Revenue", &series, PeriodKind::ThisMonth).to_string();

        assert!(options.contains("\"Current\""), "got {options}");
        assert!(options.contains("vs last month"), "got {options}");
    }

    #[test]
    fn breakdown_chart_uses_group_labels() {
        let entries = vec![GroupEntry {
            label: "pix".to_owned(),
            amount: 40.0,
            count: 1,
            percent: 100.0,
        }];

        let options = breakdown_chart("Payment Methods", &entries).to_string();

        assert!(options.contains("\"pix\""), "got {options}");
    }

    #[test]
    fn view_renders_container_and_script_per_chart() {
        let charts = [
            ReportChart {
                id: "a-chart",
                options: "{}".to_owned(),
            },
            ReportChart {
                id: "b-chart",
                options: "{}".to_owned(),
            },
        ];

        let markup = charts_view(&charts).into_string();
        let html = Html::parse_fragment(&markup);

        assert!(html.select(&Selector::parse("#a-chart").unwrap()).next().is_some());
        assert!(html.select(&Selector::parse("#b-chart").unwrap()).next().is_some());
        assert_eq!(markup.matches("echarts.init").count(), 2);
    }
}
