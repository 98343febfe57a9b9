//! Review state: the loaded transaction set, user corrections and the validation gate.
//!
//! Stats and daily sales are never stored here; they are derived from the current
//! set every time they are asked for.

use crate::aggregate::{DateOrdering, aggregate, daily_sales_with};
use extracto_core::{Category, DailySales, Stats, Transaction};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no transaction with id {0}")]
    UnknownTransaction(u32),
    #[error("Faltan {remaining} transacciones por categorizar.")]
    Uncategorized { remaining: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    transactions: Vec<Transaction>,
    validated: bool,
    ordering: DateOrdering,
}

impl ReviewSession {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            ..Self::default()
        }
    }

    pub fn with_date_ordering(mut self, ordering: DateOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Replace the whole set (a new upload). Validation starts over.
    pub fn load(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.validated = false;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Manual category change. The record stops counting as auto-categorized.
    pub fn assign(&mut self, id: u32, category: Category) -> Result<(), ReviewError> {
        let txn = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ReviewError::UnknownTransaction(id))?;
        txn.assign(category);
        tracing::debug!("transaction {} assigned to {}", id, category);
        Ok(())
    }

    /// Succeeds only when every transaction has a category.
    pub fn validate(&mut self) -> Result<(), ReviewError> {
        let remaining = self.uncategorized_count();
        if remaining > 0 {
            tracing::warn!("validation blocked: {} uncategorized", remaining);
            return Err(ReviewError::Uncategorized { remaining });
        }
        self.validated = true;
        Ok(())
    }

    pub fn categorized_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.is_categorized()).count()
    }

    pub fn auto_categorized_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.auto_categorized).count()
    }

    pub fn uncategorized_count(&self) -> usize {
        self.transactions.len() - self.categorized_count()
    }

    pub fn stats(&self) -> Option<Stats> {
        aggregate(&self.transactions, self.validated)
    }

    pub fn daily_sales(&self) -> Vec<DailySales> {
        daily_sales_with(&self.transactions, self.validated, self.ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ReviewSession {
        ReviewSession::new(vec![
            Transaction::new(0, "01/01/2024", "Venta TPV", 150.0, Some(Category::Sale)),
            Transaction::new(1, "02/01/2024", "Bizum Pedro", -20.0, None),
            Transaction::new(2, "02/01/2024", "Nomina Enero", -800.0, Some(Category::Payroll)),
        ])
    }

    #[test]
    fn test_validate_blocks_until_all_categorized() {
        let mut s = session();
        assert_eq!(s.validate(), Err(ReviewError::Uncategorized { remaining: 1 }));
        assert!(!s.is_validated());
        assert!(s.stats().is_none());
        assert!(s.daily_sales().is_empty());

        s.assign(1, Category::NotApplicable).unwrap();
        s.validate().unwrap();
        assert!(s.is_validated());

        let stats = s.stats().unwrap();
        assert_eq!(stats.sales, 150.0);
        assert_eq!(stats.payroll, 800.0);
        assert_eq!(stats.profit, -650.0);
        assert_eq!(s.daily_sales().len(), 1);
    }

    #[test]
    fn test_counts_follow_assignments() {
        let mut s = session();
        assert_eq!(s.categorized_count(), 2);
        assert_eq!(s.auto_categorized_count(), 2);
        assert_eq!(s.uncategorized_count(), 1);

        s.assign(0, Category::Other).unwrap();
        assert_eq!(s.auto_categorized_count(), 1);
        assert!(!s.transactions()[0].auto_categorized);
    }

    #[test]
    fn test_unknown_id() {
        let mut s = session();
        assert_eq!(s.assign(42, Category::Sale), Err(ReviewError::UnknownTransaction(42)));
    }

    #[test]
    fn test_load_replaces_set_and_clears_validation() {
        let mut s = session();
        s.assign(1, Category::Other).unwrap();
        s.validate().unwrap();

        s.load(vec![Transaction::new(0, "03/01/2024", "Cobro", 10.0, Some(Category::Sale))]);
        assert!(!s.is_validated());
        assert_eq!(s.transactions().len(), 1);
    }

    #[test]
    fn test_stats_follow_corrections_after_validation() {
        let mut s = session();
        s.assign(1, Category::Other).unwrap();
        s.validate().unwrap();
        assert_eq!(s.stats().unwrap().other, 20.0);

        s.assign(1, Category::NotApplicable).unwrap();
        assert_eq!(s.stats().unwrap().other, 0.0);
    }

    #[test]
    fn test_gate_message() {
        let err = ReviewError::Uncategorized { remaining: 3 };
        assert_eq!(err.to_string(), "Faltan 3 transacciones por categorizar.");
    }
}
