//! Top products & category distribution

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Category, Product, Sale};

use super::revenue_sales;
use crate::utils::money;
use crate::utils::time::TimeWindow;

/// Chart palette, assigned cyclically by rank
pub const CATEGORY_COLORS: [&str; 10] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#06B6D4", "#84CC16",
    "#F97316", "#6366F1",
];

pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Display name for revenue that cannot be traced to a category
pub const UNCATEGORIZED: &str = "Sin categoría";

fn palette_color(rank: usize) -> String {
    CATEGORY_COLORS[rank % CATEGORY_COLORS.len()].to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category_id: Option<i64>,
    pub name: String,
    pub revenue: f64,
    /// Share of total revenue, rounded to the nearest integer
    pub percentage: u32,
    pub color: String,
}

/// Lines without a catalog reference are grouped by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LineKey {
    Id(i64),
    Name(String),
}

#[derive(Default)]
struct Tally {
    name: String,
    quantity: i64,
    revenue: Decimal,
}

pub fn top_products(sales: &[Sale], window: TimeWindow) -> Vec<TopProduct> {
    let mut tallies: HashMap<LineKey, Tally> = HashMap::new();
    for line in revenue_sales(sales, window).flat_map(|s| s.lines.iter()) {
        let key = match line.product_id {
            Some(id) => LineKey::Id(id),
            None => LineKey::Name(line.product_name.clone()),
        };
        let tally = tallies.entry(key).or_insert_with(|| Tally {
            name: line.product_name.clone(),
            ..Default::default()
        });
        tally.quantity = tally.quantity.saturating_add(line.quantity);
        tally.revenue = tally
            .revenue
            .saturating_add(money::to_decimal(money::line_total(line.quantity, line.unit_price)));
    }

    let mut ranked: Vec<(LineKey, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue.cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });

    ranked
        .into_iter()
        .take(TOP_PRODUCTS_LIMIT)
        .enumerate()
        .map(|(rank, (key, tally))| TopProduct {
            product_id: match key {
                LineKey::Id(id) => Some(id),
                LineKey::Name(_) => None,
            },
            name: tally.name,
            quantity: tally.quantity,
            revenue: money::to_f64(tally.revenue),
            color: palette_color(rank),
        })
        .collect()
}

/// Category id of a product: its own id if set, else the id of the
/// category whose name matches the legacy name (case-insensitive).
pub fn resolve_category(product: &Product, categories: &[Category]) -> Option<i64> {
    if let Some(id) = product.category_id {
        return Some(id);
    }
    let legacy = product.legacy_category.as_deref()?.trim().to_lowercase();
    categories
        .iter()
        .find(|c| c.name.trim().to_lowercase() == legacy)
        .map(|c| c.id)
}

fn category_of<'a>(product: &Product, categories: &'a [Category]) -> Option<&'a Category> {
    let id = resolve_category(product, categories)?;
    categories.iter().find(|c| c.id == id)
}

pub fn category_distribution(
    sales: &[Sale],
    products: &[Product],
    categories: &[Category],
    window: TimeWindow,
) -> Vec<CategoryShare> {
    let by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    // category id (None = uncategorized) -> revenue
    let mut revenue: HashMap<Option<i64>, Decimal> = HashMap::new();
    for line in revenue_sales(sales, window).flat_map(|s| s.lines.iter()) {
        let category = line
            .product_id
            .and_then(|id| by_id.get(&id))
            .and_then(|p| category_of(p, categories));
        let amount = revenue.entry(category.map(|c| c.id)).or_default();
        *amount = amount
            .saturating_add(money::to_decimal(money::line_total(line.quantity, line.unit_price)));
    }

    let total = money::sum_decimal(revenue.values().copied());
    let mut shares: Vec<(CategoryShare, Option<&Category>)> = revenue
        .into_iter()
        .map(|(id, amount)| {
            let category = id.and_then(|id| categories.iter().find(|c| c.id == id));
            let amount = money::to_f64(amount);
            let share = CategoryShare {
                category_id: id,
                name: category
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                revenue: amount,
                percentage: money::percentage(amount, money::to_f64(total)).round() as u32,
                color: String::new(),
            };
            (share, category)
        })
        .collect();

    shares.sort_by(|(a, _), (b, _)| {
        b.percentage
            .cmp(&a.percentage)
            .then(b.revenue.total_cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });

    shares
        .into_iter()
        .enumerate()
        .map(|(rank, (mut share, category))| {
            share.color = category
                .and_then(|c| c.color.clone())
                .unwrap_or_else(|| palette_color(rank));
            share
        })
        .collect()
}
