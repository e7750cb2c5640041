//! Folding records into KPIs and grouped breakdowns.
//!
//! Every function here takes records that have already been through
//! [filter_by_window](crate::report::filter::filter_by_window), so cancelled
//! records never reach them.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

use serde::Serialize;

use crate::{category::Category, record::TransactionRecord};

/// The group for records without a category, or with one that no longer
/// exists.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The group for payments without a method and line items without a product.
pub const OTHER_LABEL: &str = "Other";

/// How many products the ranking keeps unless configured otherwise.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Scalar KPIs for a set of records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// The sum of [TransactionRecord::revenue].
    pub revenue: f64,
    /// The number of records.
    pub count: usize,
    /// The number of units sold across all line items.
    pub item_count: u64,
    /// Revenue per record, zero when there are no records.
    pub average_value: f64,
}

/// Compute the KPIs for `records`.
pub fn reduce(records: &[&TransactionRecord]) -> Metrics {
    let revenue = finite_or_zero(records.iter().map(|record| record.revenue()).sum());
    let count = records.len();
    let item_count = records.iter().map(|record| record.item_count()).sum();
    let average_value = if count == 0 {
        0.0
    } else {
        finite_or_zero(revenue / count as f64)
    };

    Metrics {
        revenue,
        count,
        item_count,
        average_value,
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// The running total for one group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct GroupTotal {
    /// The summed amount.
    pub amount: f64,
    /// The number of records in the group.
    pub count: usize,
}

/// Sum `amount_fn` over `items` grouped by `key_fn`.
///
/// Items whose key is `None` or blank are grouped under `sentinel`.
pub fn reduce_by_key<T>(
    items: impl IntoIterator<Item = T>,
    sentinel: &str,
    key_fn: impl Fn(&T) -> Option<String>,
    amount_fn: impl Fn(&T) -> f64,
) -> BTreeMap<String, GroupTotal> {
    let mut groups: BTreeMap<String, GroupTotal> = BTreeMap::new();

    for item in items {
        let key = key_fn(&item)
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| sentinel.to_owned());

        let group = groups.entry(key).or_default();
        group.amount += amount_fn(&item);
        group.count += 1;
    }

    groups
}

/// Revenue per payment method.
///
/// Every part of a split payment counts towards its own method. Records
/// without payment parts count their total under [OTHER_LABEL].
pub fn by_payment_method(records: &[&TransactionRecord]) -> BTreeMap<String, GroupTotal> {
    let parts = records.iter().flat_map(|record| {
        if record.payments.is_empty() {
            vec![(None, record.total)]
        } else {
            record
                .payments
                .iter()
                .map(|payment| (Some(payment.method.as_str()), payment.amount))
                .collect()
        }
    });

    reduce_by_key(
        parts,
        OTHER_LABEL,
        |(method, _)| method.map(str::to_owned),
        |(_, amount)| *amount,
    )
}

/// Revenue per category name.
///
/// Records without a category, or whose category is not in `categories`, are
/// grouped under [UNCATEGORIZED_LABEL].
pub fn by_category(
    records: &[&TransactionRecord],
    categories: &[Category],
) -> BTreeMap<String, GroupTotal> {
    let names: HashMap<_, _> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    reduce_by_key(
        records.iter(),
        UNCATEGORIZED_LABEL,
        |record| {
            record
                .category_id
                .and_then(|id| names.get(&id))
                .map(|name| (*name).to_owned())
        },
        |record| record.revenue(),
    )
}

/// A group total with its label, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    /// The group key, or the sentinel label for records without one.
    pub label: String,
    /// The summed amount of the group.
    pub amount: f64,
    /// The number of records in the group.
    pub count: usize,
    /// This group's share of the total amount, 0 to 100.
    pub percent: f64,
}

/// Order groups by amount, largest first, with `sentinel` always last.
pub fn sorted_by_amount(groups: &BTreeMap<String, GroupTotal>, sentinel: &str) -> Vec<GroupEntry> {
    let total: f64 = groups.values().map(|group| group.amount).sum();

    let mut entries: Vec<GroupEntry> = groups
        .iter()
        .map(|(label, group)| GroupEntry {
            label: label.clone(),
            amount: group.amount,
            count: group.count,
            percent: if total == 0.0 {
                0.0
            } else {
                finite_or_zero(group.amount / total * 100.0)
            },
        })
        .collect();

    entries.sort_by(|a, b| match (a.label == sentinel, b.label == sentinel) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => b.amount.total_cmp(&a.amount).then_with(|| a.label.cmp(&b.label)),
    });

    entries
}

/// A product's sales in a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRanking {
    /// The product name as sold.
    pub name: String,
    /// Units sold.
    pub quantity: u64,
    /// Quantity times unit price, summed.
    pub amount: f64,
}

/// The `limit` best selling products by quantity.
///
/// Ties are broken by amount, then by name. Line items are identified by
/// product name, falling back to the catalog ID; items with neither are
/// grouped under [OTHER_LABEL].
pub fn top_products(records: &[&TransactionRecord], limit: usize) -> Vec<ProductRanking> {
    let mut products: HashMap<String, ProductRanking> = HashMap::new();

    for item in records.iter().flat_map(|record| &record.line_items) {
        let name = item
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .or_else(|| item.product_id.map(|id| format!("Product #{id}")))
            .unwrap_or_else(|| OTHER_LABEL.to_owned());

        let product = products
            .entry(name.clone())
            .or_insert_with(|| ProductRanking {
                name,
                quantity: 0,
                amount: 0.0,
            });
        product.quantity += u64::from(item.quantity);
        product.amount += item.subtotal();
    }

    let mut ranking: Vec<_> = products.into_values().collect();
    ranking.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| b.amount.total_cmp(&a.amount))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranking.truncate(limit);

    ranking
}



#[cfg(test)]
mod top_products_tests {
    use crate::record::{LineItem, TransactionRecord};

    use super::{OTHER_LABEL, ProductRanking, top_products};

    #[test]
    fn ranks_by_quantity_then_amount_then_name() {
        let records = vec![
            TransactionRecord::sale(1, 0.0, "2024-03-15").line_items(vec![
                LineItem::new("Coffee", 3, 5.0),
                LineItem::new("Cake", 2, 20.0),
                LineItem::new("Bread", 2, 20.0),
            ]),
            TransactionRecord::sale(2, 0.0, "2024-03-15").line_items(vec![
                LineItem::new("Tea", 2, 4.0),
                LineItem::new("Coffee", 1, 5.0),
            ]),
        ];
        let refs: Vec<_> = records.iter().collect();

        let ranking = top_products(&refs, 10);

        let names: Vec<_> = ranking.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Bread", "Cake", "Tea"]);
        assert_eq!(
            ranking[0],
            ProductRanking {
                name: "Coffee".to_owned(),
                quantity: 4,
                amount: 20.0
            }
        );
    }

    #[test]
    fn truncates_to_limit() {
        let items = (1..=8)
            .map(|quantity| LineItem::new(&format!("Product {quantity}"), quantity, 1.0))
            .collect();
        let records = vec![TransactionRecord::sale(1, 0.0, "2024-03-15").line_items(items)];
        let refs: Vec<_> = records.iter().collect();

        let ranking = top_products(&refs, 5);

        assert_eq!(ranking.len(), 5);
        assert_eq!(ranking[0].name, "Product 8");
        assert_eq!(ranking[4].name, "Product 4");
    }

    #[test]
    fn unnamed_items_fall_back_to_id_or_other() {
        let mut by_id = LineItem::new("", 1, 1.0).product_id(9);
        by_id.product_name = None;
        let mut anonymous = LineItem::new("", 1, 1.0);
        anonymous.product_name = None;
        let records =
            vec![TransactionRecord::sale(1, 0.0, "2024-03-15").line_items(vec![by_id, anonymous])];
        let refs: Vec<_> = records.iter().collect();

        let ranking = top_products(&refs, 5);

        let names: Vec<_> = ranking.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec![OTHER_LABEL, "Product #9"]);
    }
}
