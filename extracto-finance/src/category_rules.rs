//! Deterministic category rules mapping a statement concept + amount sign
//! to the closed `Category` taxonomy.
//!
//! The table is scanned in a fixed order. Positive amounts are always sales; for
//! outflows the first category with a matching pattern wins, otherwise the row is
//! left for the user to categorize.

use extracto_core::{Category, fold, strip_accents};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use thiserror::Error;

const SALE: &[&str] = &[
    r"transfer.*en div",
    r"ingreso",
    r"cobro",
    r"venta",
    r"factura",
    r"pago.*recibido",
    r"abono",
    r"stripe",
    r"paypal",
];

const PAYROLL: &[&str] = &[
    r"nomina",
    r"salario",
    r"sueldo",
    r"tgss",
    r"seguridad social",
    r"cotizacion",
    r"irpf",
    r"autonomo",
];

const RAW_MATERIAL: &[&str] = &[
    r"compra",
    r"proveedor",
    r"material",
    r"suministro",
    r"mercaderia",
    r"stock",
];

const OVERHEAD: &[&str] = &[
    r"google ads",
    r"facebook",
    r"facebk",
    r"canva",
    r"publicidad",
    r"marketing",
    r"office",
    r"microsoft",
    r"adobe",
    r"hosting",
    r"dominio",
    r"servidor",
    r"aws",
    r"azure",
    r"dropbox",
    r"zoom",
    r"software",
    r"licencia",
    r"suscripcion",
    r"alquiler",
    r"luz",
    r"agua",
    r"telefono",
    r"internet",
    r"gestor",
    r"asesoria",
    r"seguro",
    r"banco",
    r"comision",
];

const OTHER: &[&str] = &[r"varios", r"diverso", r"miscelaneo"];

/// Built-in table. Position is precedence: payroll must be tried before
/// raw materials, and raw materials before the looser overhead patterns.
const BUILTIN: &[(Category, &[&str])] = &[
    (Category::Sale, SALE),
    (Category::Payroll, PAYROLL),
    (Category::RawMaterial, RAW_MATERIAL),
    (Category::Overhead, OVERHEAD),
    (Category::Other, OTHER),
];

static DEFAULT_RULES: LazyLock<RuleSet> = LazyLock::new(RuleSet::default);

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}' for {category}: {source}")]
    InvalidPattern {
        category: Category,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("{0} is only assigned manually and cannot carry rules")]
    NotClassifiable(Category),
}

/// Patterns for one category, in match order
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub category: Category,
    patterns: Vec<Regex>,
}

impl RuleEntry {
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    fn first_match(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(text))
            .map(Regex::as_str)
    }
}

/// Which rule decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub category: Category,
    /// `None` when a positive amount fell through to the sale default
    pub pattern: Option<&'a str>,
}

/// Ordered `(category, patterns)` table
#[derive(Debug, Clone)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
}

impl Default for RuleSet {
    fn default() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(category, sources)| RuleEntry {
                category: *category,
                patterns: sources
                    .iter()
                    .map(|p| compile(p).expect("built-in rule pattern must compile"))
                    .collect(),
            })
            .collect();
        Self { entries }
    }
}

impl RuleSet {
    /// Append user patterns after the built-in ones of `category`.
    /// Category precedence is unchanged.
    pub fn with_patterns<I, S>(mut self, category: Category, patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.category == category)
            .ok_or(RuleError::NotClassifiable(category))?;

        let before = entry.patterns.len();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            // Concepts are matched folded, so accents in user patterns must go too.
            let re = compile(&strip_accents(pattern)).map_err(|source| RuleError::InvalidPattern {
                category,
                pattern: pattern.to_string(),
                source,
            })?;
            entry.patterns.push(re);
        }
        tracing::debug!(
            "added {} pattern(s) to {}",
            entry.patterns.len() - before,
            category
        );

        Ok(self)
    }

    /// The table in scan order
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn classify(&self, concept: &str, amount: f64) -> Option<Category> {
        self.explain(concept, amount).map(|m| m.category)
    }

    /// Like [`RuleSet::classify`] but also reports the pattern that decided it.
    pub fn explain(&self, concept: &str, amount: f64) -> Option<RuleMatch<'_>> {
        let text = fold(concept);

        if amount > 0.0 {
            // Money in is revenue, pattern or not.
            let pattern = self
                .entries
                .iter()
                .find(|e| e.category == Category::Sale)
                .and_then(|e| e.first_match(&text));
            return Some(RuleMatch {
                category: Category::Sale,
                pattern,
            });
        }

        self.entries
            .iter()
            .filter(|e| e.category != Category::Sale)
            .find_map(|e| {
                e.first_match(&text).map(|pattern| RuleMatch {
                    category: e.category,
                    pattern: Some(pattern),
                })
            })
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Classify with the built-in table.
pub fn classify(concept: &str, amount: f64) -> Option<Category> {
    DEFAULT_RULES.classify(concept, amount)
}

/// The shared built-in table
pub fn default_rules() -> &'static RuleSet {
    &DEFAULT_RULES
}
