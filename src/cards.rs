//! KPI cards: a headline figure with its change against the previous period.

use maud::{Markup, html};

use crate::{
    html::{CARD_STYLE, format_percentage},
    report::{Direction, Growth},
};

const UP_STYLE: &str = "text-green-600 dark:text-green-400";
const DOWN_STYLE: &str = "text-red-600 dark:text-red-400";
const FLAT_STYLE: &str = "text-gray-500 dark:text-gray-400";

/// A single KPI card.
pub struct KpiCard<'a> {
    pub title: &'a str,
    /// The figure for the current window, already formatted.
    pub value: String,
    pub growth: Growth,
    /// Text naming the previous window, e.g. "vs last month".
    pub comparison: &'a str,
    /// Set to `false` for figures like expenses, where going down is good.
    pub higher_is_better: bool,
}

impl<'a> KpiCard<'a> {
    pub fn new(title: &'a str, value: String, growth: Growth, comparison: &'a str) -> Self {
        Self {
            title,
            value,
            growth,
            comparison,
            higher_is_better: true,
        }
    }

    pub fn lower_is_better(mut self) -> Self {
        self.higher_is_better = false;
        self
    }

    fn growth_style(&self) -> &'static str {
        match (self.growth.direction, self.higher_is_better) {
            (Direction::Flat, _) => FLAT_STYLE,
            (Direction::Up, true) | (Direction::Down, false) => UP_STYLE,
            (Direction::Up, false) | (Direction::Down, true) => DOWN_STYLE,
        }
    }

    pub fn into_html(self) -> Markup {
        let arrow = match self.growth.direction {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Flat => "■",
        };
        let change = format!("{}%", format_percentage(self.growth.magnitude()));

        html!(
            div class={(CARD_STYLE) " flex flex-col gap-1"} data-kpi=(self.title)
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { (self.title) }

                span class="text-2xl font-bold" data-kpi-value { (self.value) }

                span class={"text-sm " (self.growth_style())} data-direction=(direction_name(self.growth.direction))
                {
                    span aria-hidden="true" { (arrow) " " }
                    (change)
                    span class="text-gray-500 dark:text-gray-400" { " " (self.comparison) }
                }
            }
        )
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Flat => "flat",
    }
}

/// Lays out KPI cards in a responsive grid.
pub fn kpi_grid(cards: Vec<KpiCard<'_>>) -> Markup {
    html!(
        section id="kpis" class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-4"
        {
            @for card in cards {
                (card.into_html())
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::report::Growth;

    use super::{DOWN_STYLE, KpiCard, UP_STYLE, kpi_grid};

    #[test]
    fn shows_magnitude_without_sign() {
        let card = KpiCard::new(
            "Revenue",
            "$50.00".to_owned(),
            Growth::between(50.0, 100.0),
            "vs last month",
        );

        let html = Html::parse_fragment(&card.into_html().into_string());
        let text: String = html.root_element().text().collect();

        assert!(text.contains("50%"), "got {text}");
        assert!(!text.contains("-50%"), "got {text}");
        assert!(text.contains("vs last month"), "got {text}");
    }

    #[test]
    fn expense_increase_is_shown_as_bad() {
        let revenue = KpiCard::new("Revenue", String::new(), Growth::between(2.0, 1.0), "");
        let expense =
            KpiCard::new("Expense", String::new(), Growth::between(2.0, 1.0), "").lower_is_better();

        assert_eq!(revenue.growth_style(), UP_STYLE);
        assert_eq!(expense.growth_style(), DOWN_STYLE);
    }

    #[test]
    fn grid_renders_every_card() {
        let cards = vec![
            KpiCard::new("Revenue", "$1.00".to_owned(), Growth::between(1.0, 1.0), ""),
            KpiCard::new("Sales", "1".to_owned(), Growth::between(1.0, 0.0), ""),
        ];

        let html = Html::parse_fragment(&kpi_grid(cards).into_string());
        let flat = Selector::parse("[data-direction='flat']").unwrap();
        let up = Selector::parse("[data-direction='up']").unwrap();

        assert_eq!(html.select(&Selector::parse("[data-kpi]").unwrap()).count(), 2);
        assert_eq!(html.select(&flat).count(), 1);
        assert_eq!(html.select(&up).count(), 1);
    }
}
