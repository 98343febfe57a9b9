//! Transaction records and the closed category taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transaction categories. The set is closed: every consumer uses exactly these tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Sale,
    Payroll,
    RawMaterial,
    Overhead,
    Other,
    NotApplicable,
}

impl Category {
    /// Every category, in the order a picker should list them
    pub const ALL: [Category; 6] = [
        Category::Sale,
        Category::Overhead,
        Category::Payroll,
        Category::RawMaterial,
        Category::Other,
        Category::NotApplicable,
    ];

    /// Cost categories in share-correction priority order
    pub const COSTS: [Category; 4] = [
        Category::Overhead,
        Category::Payroll,
        Category::RawMaterial,
        Category::Other,
    ];

    /// Wire token (`sale`, `rawMaterial`, ...)
    pub fn token(&self) -> &'static str {
        match self {
            Category::Sale => "sale",
            Category::Payroll => "payroll",
            Category::RawMaterial => "rawMaterial",
            Category::Overhead => "overhead",
            Category::Other => "other",
            Category::NotApplicable => "notApplicable",
        }
    }

    /// Spanish display label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Sale => "Venta",
            Category::Payroll => "Personal",
            Category::RawMaterial => "Materia Prima",
            Category::Overhead => "Gastos Generales",
            Category::Other => "Otros Gastos",
            Category::NotApplicable => "No Aplica",
        }
    }

    /// True for the four categories that add up to total costs
    pub fn is_cost(&self) -> bool {
        Category::COSTS.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the wire tokens case-insensitively, plus the Spanish tokens used by
    /// older exports (`venta`, `gastos`, `no-aplica`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sale" | "venta" => Ok(Category::Sale),
            "payroll" | "personal" => Ok(Category::Payroll),
            "rawmaterial" | "raw-material" | "materia" => Ok(Category::RawMaterial),
            "overhead" | "gastos" => Ok(Category::Overhead),
            "other" | "otros" => Ok(Category::Other),
            "notapplicable" | "not-applicable" | "no-aplica" => Ok(Category::NotApplicable),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// One row of an uploaded bank statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Row-order sequence number, unique per parse
    pub id: u32,
    /// Date exactly as it appeared in the source file
    pub date: String,
    /// Encoding-repaired free text
    pub concept: String,
    /// Positive = inflow, negative = outflow
    pub amount: f64,
    /// `None` means the transaction still needs a manual category
    pub category: Option<Category>,
    /// Set when the category came from the rule table
    pub auto_categorized: bool,
}

impl Transaction {
    /// Build a record as produced by the classifier. `auto_categorized` follows
    /// whether a category was found.
    pub fn new(
        id: u32,
        date: impl Into<String>,
        concept: impl Into<String>,
        amount: f64,
        category: Option<Category>,
    ) -> Self {
        Self {
            id,
            date: date.into(),
            concept: concept.into(),
            amount,
            category,
            auto_categorized: category.is_some(),
        }
    }

    /// Manual reassignment. Always clears the auto flag.
    pub fn assign(&mut self, category: Category) {
        self.category = Some(category);
        self.auto_categorized = false;
    }

    pub fn is_categorized(&self) -> bool {
        self.category.is_some()
    }

    /// Returns true if this is an inflow (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Returns true if this is an outflow (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
