//! Plain-text and JSON rendering of a review session

use extracto_core::{Category, DailySales, Stats, Transaction, format_eur};
use extracto_finance::{ReviewSession, RuleSet};
use serde::Serialize;
use std::fmt::Write as _;

const CONCEPT_WIDTH: usize = 34;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    pub transactions: &'a [Transaction],
    pub categorized: usize,
    pub auto_categorized: usize,
    pub uncategorized: usize,
    pub validated: bool,
    pub stats: Option<Stats>,
    pub daily_sales: Vec<DailySales>,
}

impl<'a> AnalysisReport<'a> {
    pub fn from_session(session: &'a ReviewSession) -> Self {
        Self {
            transactions: session.transactions(),
            categorized: session.categorized_count(),
            auto_categorized: session.auto_categorized_count(),
            uncategorized: session.uncategorized_count(),
            validated: session.is_validated(),
            stats: session.stats(),
            daily_sales: session.daily_sales(),
        }
    }
}

pub fn render_text(report: &AnalysisReport<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:>4}  {:<10}  {:<w$}  {:>14}  Categoría",
        "ID",
        "Fecha",
        "Concepto",
        "Importe",
        w = CONCEPT_WIDTH
    );
    for t in report.transactions {
        let category = match t.category {
            Some(c) if t.auto_categorized => format!("{} (auto)", c.label()),
            Some(c) => c.label().to_string(),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<10}  {:<w$}  {:>14}  {}",
            t.id,
            t.date,
            truncate(&t.concept, CONCEPT_WIDTH),
            format_eur(t.amount),
            category,
            w = CONCEPT_WIDTH
        );
    }

    let _ = writeln!(
        out,
        "\n{} transacciones: {} categorizadas ({} automáticas), {} sin categorizar",
        report.transactions.len(),
        report.categorized,
        report.auto_categorized,
        report.uncategorized
    );

    if let Some(stats) = &report.stats {
        out.push('\n');
        render_stats(&mut out, stats);
    }

    if report.validated && !report.daily_sales.is_empty() {
        out.push_str("\nVentas diarias\n");
        for day in &report.daily_sales {
            let _ = writeln!(out, "  {:<12}{:>14}", day.date, format_eur(day.total_sales));
        }
    }

    out
}

fn render_stats(out: &mut String, stats: &Stats) {
    let r = &stats.ratios;
    let _ = writeln!(out, "Resumen");
    let _ = writeln!(out, "  {:<18}{:>14}", "Ventas", format_eur(stats.sales));
    for (category, total, share) in [
        (Category::Overhead, stats.overhead, r.overhead_share),
        (Category::Payroll, stats.payroll, r.payroll_share),
        (Category::RawMaterial, stats.raw_material, r.raw_material_share),
        (Category::Other, stats.other, r.other_share),
    ] {
        let _ = writeln!(
            out,
            "  {:<18}{:>14}  {:>3}%",
            category.label(),
            format_eur(total),
            share
        );
    }
    let _ = writeln!(out, "  {:<18}{:>14}", "Costes totales", format_eur(stats.total_costs));
    let _ = writeln!(out, "  {:<18}{:>14}", "Beneficio", format_eur(stats.profit));
    let _ = writeln!(out, "  {:<18}{:>13}%", "Margen", r.margin);
}

/// The rule table in scan order, one category per line.
pub fn render_rules(rules: &RuleSet) -> String {
    let mut out = String::new();
    for (i, entry) in rules.entries().iter().enumerate() {
        let patterns: Vec<&str> = entry.patterns().collect();
        let _ = writeln!(
            out,
            "{}. {} ({}): {}",
            i + 1,
            entry.category.label(),
            entry.category.token(),
            patterns.join(", ")
        );
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut t: String = s.chars().take(width - 1).collect();
    t.push('…');
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ReviewSession {
        ReviewSession::new(vec![
            Transaction::new(0, "01/01/2024", "Venta TPV", 150.0, Some(Category::Sale)),
            Transaction::new(1, "02/01/2024", "Bizum Pedro", -20.0, None),
            Transaction::new(2, "02/01/2024", "Nomina Enero", -100.0, Some(Category::Payroll)),
        ])
    }

    #[test]
    fn test_unvalidated_report_has_no_summary() {
        let s = session();
        let text = render_text(&AnalysisReport::from_session(&s));
        assert!(text.contains("Venta TPV"));
        assert!(text.contains("Venta (auto)"));
        assert!(text.contains("3 transacciones: 2 categorizadas (2 automáticas), 1 sin categorizar"));
        assert!(!text.contains("Resumen"));
        assert!(!text.contains("Ventas diarias"));
    }

    #[test]
    fn test_validated_report_has_stats_and_days() {
        let mut s = session();
        s.assign(1, Category::Other).unwrap();
        s.validate().unwrap();

        let text = render_text(&AnalysisReport::from_session(&s));
        assert!(text.contains("Otros Gastos"));
        assert!(text.contains("Resumen"));
        assert!(text.contains("150,00\u{a0}€"));
        assert!(text.contains("Ventas diarias"));
        // 30 / 150
        assert!(text.contains("20.0%"));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut s = session();
        s.assign(1, Category::NotApplicable).unwrap();
        s.validate().unwrap();

        let json = serde_json::to_value(AnalysisReport::from_session(&s)).unwrap();
        assert_eq!(json["autoCategorized"], 2);
        assert_eq!(json["validated"], true);
        assert_eq!(json["stats"]["ratios"]["payrollShare"], 100);
        assert_eq!(json["dailySales"][0]["totalSales"], 150.0);
        assert_eq!(json["transactions"][1]["category"], "notApplicable");
    }

    #[test]
    fn test_rules_listing_is_in_scan_order() {
        let text = render_rules(&RuleSet::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("1. Venta (sale)"));
        assert!(lines[1].starts_with("2. Personal (payroll): nomina"));
        assert!(lines[4].starts_with("5. Otros Gastos (other)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("corto", 10), "corto");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
