//! extracto-core: transaction records, category taxonomy and derived summary types

pub mod money;
pub mod stats;
pub mod text;
pub mod transaction;

pub use money::format_eur;
pub use stats::{DailySales, Ratios, Stats};
pub use text::{fold, strip_accents};
pub use transaction::{Category, Transaction, UnknownCategory};
