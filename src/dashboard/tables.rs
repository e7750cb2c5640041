//! Table views for the sales dashboard.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    report::{PeriodReport, ProductRanking},
    tables::{ComparisonRow, comparison_table, table_section},
};

const RANK_CELL_STYLE: &str = "px-6 py-4 w-12 text-gray-400";
const NUMBER_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";

/// The best selling products of the current window, by quantity.
pub(super) fn top_products_table(products: &[ProductRanking]) -> Markup {
    if products.is_empty() {
        return table_section(
            "top-products",
            "Top Products",
            html!(p class="p-4 text-sm text-gray-600 dark:text-gray-400" { "No items sold in this period." }),
        );
    }

    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
            thead class=(TABLE_HEADER_STYLE) {
                tr {
                    th scope="col" class=(RANK_CELL_STYLE) { "#" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Product" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Quantity" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Revenue" }
                }
            }
            tbody {
                @for (rank, product) in products.iter().enumerate() {
                    tr class=(TABLE_ROW_STYLE) {
                        td class=(RANK_CELL_STYLE) { (rank + 1) }
                        th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                            (product.name)
                        }
                        td class=(NUMBER_CELL_STYLE) { (product.quantity) }
                        td class=(NUMBER_CELL_STYLE) { (format_currency(product.amount)) }
                    }
                }
            }
        }
    };

    table_section("top-products", "Top Products", table)
}

/// Every KPI for both windows side by side.
pub(super) fn sales_summary_table(report: &PeriodReport) -> Markup {
    let rows = [
        ComparisonRow {
            label: "Revenue",
            current: format_currency(report.current.revenue),
            previous: format_currency(report.previous.revenue),
            growth: report.revenue_growth,
        },
        ComparisonRow {
            label: "Sales",
            current: report.current.count.to_string(),
            previous: report.previous.count.to_string(),
            growth: report.count_growth,
        },
        ComparisonRow {
            label: "Items sold",
            current: report.current.item_count.to_string(),
            previous: report.previous.item_count.to_string(),
            growth: report.item_count_growth,
        },
        ComparisonRow {
            label: "Average ticket",
            current: format_currency(report.current.average_value),
            previous: format_currency(report.previous.average_value),
            growth: report.average_value_growth,
        },
    ];

    comparison_table(
        "sales-summary",
        "Summary",
        report.range.period.comparison_label(),
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::report::ProductRanking;

    use super::top_products_table;

    #[test]
    fn ranks_start_at_one() {
        let products = vec![
            ProductRanking {
                name: "Coffee".to_owned(),
                quantity: 6,
                amount: 30.0,
            },
            ProductRanking {
                name: "Cake".to_owned(),
                quantity: 1,
                amount: 12.0,
            },
        ];

        let html = Html::parse_fragment(&top_products_table(&products).into_string());
        let rows: Vec<String> = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.text().collect::<Vec<_>>().join("|"))
            .collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("1|Coffee|6|"), "got {}", rows[0]);
        assert!(rows[1].starts_with("2|Cake|1|"), "got {}", rows[1]);
    }
}
