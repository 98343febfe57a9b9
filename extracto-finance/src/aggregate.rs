//! Aggregation of a validated transaction set into `Stats` and a daily sales series.

use chrono::NaiveDate;
use extracto_core::{Category, DailySales, Ratios, Stats, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Date formats tried by [`DateOrdering::Calendar`]
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%y"];

/// How the daily sales series is ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrdering {
    /// Reverse the `/`-separated tokens (`DD/MM/YYYY` -> `YYYYMMDD`) and compare
    /// lexically. Only chronological for consistent `DD/MM/YYYY` input.
    #[default]
    ReversedTokens,
    /// Parse the date with a few common formats, falling back to the reversed-token key.
    Calendar,
}

impl DateOrdering {
    fn sort_key(&self, date: &str) -> String {
        match self {
            DateOrdering::ReversedTokens => reversed_token_key(date),
            DateOrdering::Calendar => DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(date.trim(), fmt).ok())
                .map(|d| d.format("%Y%m%d").to_string())
                .unwrap_or_else(|| reversed_token_key(date)),
        }
    }
}

/// `"01/02/2024"` -> `"20240201"`. Strings without `/` come back unchanged.
pub fn reversed_token_key(date: &str) -> String {
    date.split('/').rev().collect()
}

/// Summarize a validated set. Returns `None` until the user has validated.
pub fn aggregate(transactions: &[Transaction], validated: bool) -> Option<Stats> {
    if !validated {
        return None;
    }

    let mut totals: HashMap<Category, f64> = HashMap::new();
    for t in transactions {
        match t.category {
            Some(category) if category == Category::Sale || category.is_cost() => {
                *totals.entry(category).or_insert(0.0) += t.abs_amount()
            }
            _ => {}
        }
    }
    let total = |c: Category| totals.get(&c).copied().unwrap_or(0.0);

    let sales = total(Category::Sale);
    let overhead = total(Category::Overhead);
    let payroll = total(Category::Payroll);
    let raw_material = total(Category::RawMaterial);
    let other = total(Category::Other);

    let total_costs = overhead + payroll + raw_material + other;
    let profit = sales - total_costs;

    let [overhead_share, payroll_share, raw_material_share, other_share] =
        cost_shares([overhead, payroll, raw_material, other], total_costs);

    Some(Stats {
        sales,
        overhead,
        payroll,
        raw_material,
        other,
        total_costs,
        profit,
        ratios: Ratios {
            overhead_share,
            payroll_share,
            raw_material_share,
            other_share,
            margin: margin(profit, sales),
        },
    })
}

/// Rounded percentage of each cost over `total_costs`, corrected to sum to 100.
///
/// `costs` is in `Category::COSTS` order; the rounding difference goes to the largest
/// unrounded share, earliest category on ties.
fn cost_shares(costs: [f64; 4], total_costs: f64) -> [i64; 4] {
    let percents = costs.map(|c| if total_costs > 0.0 { c / total_costs * 100.0 } else { 0.0 });
    let mut rounded = percents.map(|p| p.round() as i64);

    if total_costs > 0.0 {
        let diff = 100 - rounded.iter().sum::<i64>();
        if diff != 0 {
            let max = percents.iter().copied().fold(f64::MIN, f64::max);
            if let Some(idx) = percents.iter().position(|p| *p == max) {
                rounded[idx] += diff;
            }
        }
    }

    rounded
}

fn margin(profit: f64, sales: f64) -> String {
    if sales > 0.0 {
        one_decimal(profit / sales * 100.0)
    } else {
        "0.0".to_string()
    }
}

/// One decimal place, rounded on the exact binary value (0.35 is stored as
/// 0.3499..., so it gives "0.3"). Exact ties round up in magnitude; the sign is
/// kept even when the digits round to zero ("-0.0").
fn one_decimal(x: f64) -> String {
    let sign = if x < 0.0 { "-" } else { "" };
    let a = x.abs();
    // The only doubles exactly halfway between two tenths end in .x25 or .x75,
    // i.e. are multiples of 0.25 that are not multiples of 0.5.
    let tie = (a * 4.0).fract() == 0.0 && (a * 2.0).fract() != 0.0;
    let digits = if tie {
        format!("{:.1}", (a * 10.0).ceil() / 10.0)
    } else {
        format!("{a:.1}")
    };
    format!("{sign}{digits}")
}

/// Per-day sales of a validated set, ordered by the reversed-token date key.
pub fn daily_sales(transactions: &[Transaction], validated: bool) -> Vec<DailySales> {
    daily_sales_with(transactions, validated, DateOrdering::default())
}

/// Per-day sales with an explicit ordering. Equal keys keep first-seen order.
pub fn daily_sales_with(
    transactions: &[Transaction],
    validated: bool,
    ordering: DateOrdering,
) -> Vec<DailySales> {
    if !validated {
        return Vec::new();
    }

    let mut days: Vec<DailySales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for t in transactions.iter().filter(|t| t.category == Some(Category::Sale)) {
        match index.get(t.date.as_str()) {
            Some(&i) => days[i].total_sales += t.abs_amount(),
            None => {
                index.insert(t.date.as_str(), days.len());
                days.push(DailySales {
                    date: t.date.clone(),
                    total_sales: t.abs_amount(),
                });
            }
        }
    }

    days.sort_by_cached_key(|d| ordering.sort_key(&d.date));
    days
}
