//! Tables shared by the sales and finance screens.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    report::{GroupEntry, Growth},
};

pub const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
pub const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";
const NUMBER_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";

/// Gets the CSS class for coloring amounts (green for positive, red for negative).
pub fn amount_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        TABLE_CELL_GREEN_STYLE
    } else {
        TABLE_CELL_RED_STYLE
    }
}

/// A titled table wrapped in the card frame every report table uses.
pub fn table_section(id: &str, title: &str, table: Markup) -> Markup {
    html! {
        div id=(id) class="w-full" {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow" {
                (table)
            }
        }
    }
}

/// One row per group with its amount, number of records and share of the total.
///
/// Renders a short note instead of an empty table when there are no groups.
pub fn breakdown_table(id: &str, title: &str, entries: &[GroupEntry]) -> Markup {
    if entries.is_empty() {
        return table_section(
            id,
            title,
            html!(p class="p-4 text-sm text-gray-600 dark:text-gray-400" { "No data for this period." }),
        );
    }

    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
            thead class=(TABLE_HEADER_STYLE) {
                tr {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Amount" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Count" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Share" }
                }
            }
            tbody {
                @for entry in entries {
                    tr class=(TABLE_ROW_STYLE) {
                        th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                            (entry.label)
                        }
                        td class=(NUMBER_CELL_STYLE) { (format_currency(entry.amount)) }
                        td class=(NUMBER_CELL_STYLE) { (entry.count) }
                        td class=(NUMBER_CELL_STYLE) { (format!("{:.1}%", entry.percent)) }
                    }
                }
            }
        }
    };

    table_section(id, title, table)
}

/// A row comparing a figure across the two windows.
pub struct ComparisonRow<'a> {
    pub label: &'a str,
    pub current: String,
    pub previous: String,
    pub growth: Growth,
}

/// Current against previous window for a handful of figures.
pub fn comparison_table(id: &str, title: &str, comparison_label: &str, rows: &[ComparisonRow<'_>]) -> Markup {
    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
            thead class=(TABLE_HEADER_STYLE) {
                tr {
                    th scope="col" class=(TABLE_CELL_STYLE) { "" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Current" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Previous" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Change " (comparison_label) }
                }
            }
            tbody {
                @for row in rows {
                    tr class=(TABLE_ROW_STYLE) {
                        th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                            (row.label)
                        }
                        td class=(NUMBER_CELL_STYLE) { (row.current) }
                        td class=(NUMBER_CELL_STYLE) { (row.previous) }
                        td class={(NUMBER_CELL_STYLE) " " (amount_color_class(row.growth.percent))} {
                            (format!("{:+.1}%", row.growth.percent))
                        }
                    }
                }
            }
        }
    };

    table_section(id, title, table)
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::report::{GroupEntry, Growth};

    use super::{ComparisonRow, breakdown_table, comparison_table};

    #[test]
    fn breakdown_table_has_row_per_entry() {
        let entries = vec![
            GroupEntry {
                label: "pix".to_owned(),
                amount: 60.0,
                count: 2,
                percent: 60.0,
            },
            GroupEntry {
                label: "Other".to_owned(),
                amount: 40.0,
                count: 1,
                percent: 40.0,
            },
        ];

        let html = Html::parse_fragment(&breakdown_table("methods", "Methods", &entries).into_string());
        let rows: Vec<String> = html
            .select(&Selector::parse("tbody th").unwrap())
            .map(|cell| cell.text().collect())
            .collect();

        assert_eq!(rows, vec!["pix", "Other"]);
    }

    #[test]
    fn empty_breakdown_shows_note() {
        let html = Html::parse_fragment(&breakdown_table("methods", "Methods", &[]).into_string());

        assert!(html.select(&Selector::parse("table").unwrap()).next().is_none());
        assert!(html.html().contains("No data for this period."));
    }

    #[test]
    fn comparison_table_shows_signed_change() {
        let rows = [ComparisonRow {
            label: "Revenue",
            current: "$50.00".to_owned(),
            previous: "$100.00".to_owned(),
            growth: Growth::between(50.0, 100.0),
        }];

        let markup = comparison_table("summary", "Summary", "vs last month", &rows).into_string();

        assert!(markup.contains("-50.0%"), "got {markup}");
    }
}
