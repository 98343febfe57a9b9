//! Derived, read-only summaries of a validated transaction set

use serde::{Deserialize, Serialize};

/// Category totals and cost ratios. Totals are sums of absolute amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub sales: f64,
    pub overhead: f64,
    pub payroll: f64,
    pub raw_material: f64,
    pub other: f64,
    /// overhead + payroll + raw_material + other
    pub total_costs: f64,
    /// sales - total_costs
    pub profit: f64,
    pub ratios: Ratios,
}

/// Integer percentage shares of total costs plus the profit margin.
///
/// When `total_costs > 0` the four shares sum to exactly 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
    pub overhead_share: i64,
    pub payroll_share: i64,
    pub raw_material_share: i64,
    pub other_share: i64,
    /// profit / sales * 100 with one decimal place, "0.0" without sales
    pub margin: String,
}

impl Ratios {
    pub fn share_sum(&self) -> i64 {
        self.overhead_share + self.payroll_share + self.raw_material_share + self.other_share
    }
}

/// Total sales for one raw date string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: String,
    pub total_sales: f64,
}
