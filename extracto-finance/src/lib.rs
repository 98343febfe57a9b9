//! extracto-finance: category rules, aggregation into stats, and the review/validation state

pub mod aggregate;
pub mod category_rules;
pub mod review;

pub use aggregate::{DateOrdering, aggregate, daily_sales, daily_sales_with};
pub use category_rules::{RuleEntry, RuleError, RuleMatch, RuleSet, classify, default_rules};
pub use review::{ReviewError, ReviewSession};
