//! Expense breakdown by category, largest first.

use serde::Serialize;
use std::collections::HashMap;
use tally_core::{Category, Transaction};

/// One category's share of total expenses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub value: f64,
    /// Fraction of total expense, 0.0 - 1.0
    pub share: f64,
}

/// Sum expenses per category. Categories with nothing spent are dropped;
/// ids not found in `categories` are reported under the raw id.
pub fn category_breakdown(txns: &[Transaction], categories: &[Category]) -> Vec<CategorySlice> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        *totals.entry(t.category.as_str()).or_default() += t.amount;
    }

    let grand_total: f64 = totals.values().sum();

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(id, value)| {
            let known = categories.iter().find(|c| c.id == id);
            CategorySlice {
                category_id: id.to_string(),
                name: known.map(|c| c.name.clone()).unwrap_or_else(|| id.to_string()),
                icon: known.map(|c| c.icon.clone()).unwrap_or_else(|| "🏷️".to_string()),
                color: known
                    .map(|c| c.color.clone())
                    .unwrap_or_else(|| "#64748b".to_string()),
                value,
                share: if grand_total > 0.0 { value / grand_total } else { 0.0 },
            }
        })
        .collect();

    // Value descending; id keeps ties stable across HashMap orderings.
    slices.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    slices
}
