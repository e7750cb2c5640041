//! Table views for the finance screen.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    report::FinanceReport,
    tables::{ComparisonRow, amount_color_class, comparison_table, table_section},
    wallet::WalletForecast,
};

const NUMBER_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";

pub(super) fn cash_flow_summary_table(report: &FinanceReport) -> Markup {
    let rows = [
        ComparisonRow {
            label: "Income",
            current: format_currency(report.current.income),
            previous: format_currency(report.previous.income),
            growth: report.income_growth,
        },
        ComparisonRow {
            label: "Expense",
            current: format_currency(report.current.expense),
            previous: format_currency(report.previous.expense),
            growth: report.expense_growth,
        },
        ComparisonRow {
            label: "Net",
            current: format_currency(report.current.net),
            previous: format_currency(report.previous.net),
            growth: report.net_growth,
        },
    ];

    comparison_table(
        "cash-flow-summary",
        "Summary",
        report.range.period.comparison_label(),
        &rows,
    )
}

/// Current and predicted balance of every wallet, with a total row.
///
/// The predicted balance settles every pending income and expense.
pub(super) fn wallets_table(
    wallets: &[WalletForecast],
    total_balance: f64,
    total_predicted_balance: f64,
) -> Markup {
    if wallets.is_empty() {
        return table_section(
            "wallets",
            "Wallets",
            html!(p class="p-4 text-sm text-gray-600 dark:text-gray-400" { "No wallets yet." }),
        );
    }

    let table = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
            thead class=(TABLE_HEADER_STYLE) {
                tr {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Balance" }
                    th scope="col" class=(NUMBER_CELL_STYLE) { "Predicted" }
                }
            }
            tbody {
                @for forecast in wallets {
                    tr class=(TABLE_ROW_STYLE) {
                        th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                            span
                                class="inline-block w-3 h-3 mr-2 rounded-full"
                                style={"background-color: " (forecast.wallet.color)}
                            {}
                            (forecast.wallet.name)
                        }
                        td class=(TABLE_CELL_STYLE) { (forecast.wallet.kind.label()) }
                        td class={(NUMBER_CELL_STYLE) " " (amount_color_class(forecast.wallet.balance))} {
                            (format_currency(forecast.wallet.balance))
                        }
                        td class={(NUMBER_CELL_STYLE) " " (amount_color_class(forecast.predicted_balance))} {
                            (format_currency(forecast.predicted_balance))
                        }
                    }
                }
            }
            tfoot {
                tr class="font-semibold text-gray-900 dark:text-white" {
                    th scope="row" class=(TABLE_CELL_STYLE) colspan="2" { "Total" }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(total_balance)) }
                    td class=(NUMBER_CELL_STYLE) data-total-predicted { (format_currency(total_predicted_balance)) }
                }
            }
        }
    };

    table_section("wallets", "Wallets", table)
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::wallet::{Wallet, WalletForecast, WalletKind};

    use super::wallets_table;

    #[test]
    fn shows_predicted_balance_and_total() {
        let wallets = vec![WalletForecast {
            wallet: Wallet {
                id: 1,
                name: "Bank".to_owned(),
                balance: 1000.0,
                color: "#2563eb".to_owned(),
                kind: WalletKind::Bank,
            },
            predicted_balance: 700.0,
        }];

        let html = Html::parse_fragment(&wallets_table(&wallets, 1000.0, 700.0).into_string());

        let rows = html.select(&Selector::parse("tbody tr").unwrap()).count();
        let total: String = html
            .select(&Selector::parse("td[data-total-predicted]").unwrap())
            .flat_map(|cell| cell.text())
            .collect();

        assert_eq!(rows, 1);
        assert_eq!(total, "$700.00");
    }
}
