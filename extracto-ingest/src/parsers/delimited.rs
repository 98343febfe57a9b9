//! Delimited bank-statement parser (CSV / TSV / semicolon exports)
//!
//! Exports usually carry a preamble (account holder, IBAN, period) before the real
//! header row, so the header is located by content:
//!
//!   Cuenta: ES12 3456 ...
//!   Fecha;Concepto;Importe;Saldo
//!   01/01/2024;Venta TPV;150,00;1.150,00

use extracto_core::{Transaction, fold};
use extracto_finance::{RuleSet, default_rules};

use crate::amount::{parse_amount, parse_amount_strict};
use crate::encoding::repair;
use crate::error::{Column, IngestionError};

const CONCEPT_WORDS: &[&str] = &["concepto", "descripcion", "description"];
const DATE_WORDS: &[&str] = &["fecha", "date"];
const AMOUNT_WORDS: &[&str] = &["importe", "cantidad", "amount"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject unreadable amount cells instead of reading them as zero
    pub strict_amounts: bool,
}

/// Column indices resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub concept: usize,
    pub amount: usize,
}

impl ColumnMap {
    /// First header containing one of the role's words wins.
    pub fn resolve(headers: &[String]) -> Result<Self, IngestionError> {
        let folded: Vec<String> = headers.iter().map(|h| fold(&repair(h))).collect();
        let find = |words: &[&str]| {
            folded
                .iter()
                .position(|h| words.iter().any(|w| h.contains(w)))
        };

        let date = find(DATE_WORDS);
        let concept = find(CONCEPT_WORDS);
        let amount = find(AMOUNT_WORDS);

        match (date, concept, amount) {
            (Some(date), Some(concept), Some(amount)) => Ok(Self {
                date,
                concept,
                amount,
            }),
            _ => {
                let missing = [
                    (date, Column::Date),
                    (concept, Column::Concept),
                    (amount, Column::Amount),
                ]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, col)| col)
                .collect();
                Err(IngestionError::MissingColumns { missing })
            }
        }
    }
}

pub struct StatementParser<'r> {
    rules: &'r RuleSet,
    options: ParseOptions,
}

impl<'r> StatementParser<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a whole statement. Either every data row is read or nothing is.
    pub fn parse(&self, raw: &str) -> Result<Vec<Transaction>, IngestionError> {
        let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        // (1-based line number, line)
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line))
            .collect();

        let header_idx = find_header(&lines).ok_or(IngestionError::HeaderNotFound)?;
        let (header_line, header) = lines[header_idx];
        let columns = ColumnMap::resolve(&split_fields(header))?;
        tracing::debug!(
            "header on line {}: date={} concept={} amount={}",
            header_line,
            columns.date,
            columns.concept,
            columns.amount
        );

        let mut out = Vec::new();
        for (seq, (line_no, line)) in lines[header_idx + 1..].iter().enumerate() {
            let fields = split_fields(line);
            let cell = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");

            let raw_amount = match cell(columns.amount) {
                "" => "0",
                other => other,
            };
            let amount = if self.options.strict_amounts {
                parse_amount_strict(raw_amount).map_err(|_| IngestionError::InvalidAmount {
                    line: *line_no,
                    raw: raw_amount.to_string(),
                })?
            } else {
                parse_amount(raw_amount)
            };

            let concept = repair(cell(columns.concept));
            if concept.is_empty() && amount == 0.0 {
                continue;
            }

            let category = self.rules.classify(&concept, amount);
            out.push(Transaction::new(
                seq as u32,
                cell(columns.date),
                concept,
                amount,
                category,
            ));
        }

        let inflows = out.iter().filter(|t| t.is_income()).count();
        let outflows = out.iter().filter(|t| t.is_expense()).count();
        let uncategorized = out.iter().filter(|t| !t.is_categorized()).count();
        tracing::debug!(
            "parsed {} transactions ({} in, {} out, {} need a manual category)",
            out.len(),
            inflows,
            outflows,
            uncategorized
        );

        Ok(out)
    }
}

/// Parse with the built-in rules and default options.
pub fn parse_statement(raw: &str) -> Result<Vec<Transaction>, IngestionError> {
    StatementParser::new(default_rules()).parse(raw)
}

fn find_header(lines: &[(usize, &str)]) -> Option<usize> {
    lines
        .iter()
        .position(|(_, line)| is_header_line(&fold(&repair(line))))
        .or_else(|| lines.iter().position(|(_, line)| line.contains('\t')))
}

fn is_header_line(folded: &str) -> bool {
    folded.contains("concepto")
        && (folded.contains("fecha") || folded.contains("date"))
        && (folded.contains("importe") || folded.contains("amount"))
}

/// Tab when the line has one, otherwise semicolon, otherwise comma.
fn delimiter_for(line: &str) -> u8 {
    if line.contains('\t') {
        b'\t'
    } else if line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Split one line into trimmed fields. Double-quoted fields may contain the delimiter.
pub fn split_fields(line: &str) -> Vec<String> {
    let delimiter = delimiter_for(line);

    let quotes = line.matches('"').count();
    if quotes > 0 && quotes % 2 == 0 {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(line.as_bytes());
        if let Some(Ok(record)) = reader.records().next() {
            return record.iter().map(|f| f.trim().to_string()).collect();
        }
    }

    line.split(char::from(delimiter))
        .map(|f| f.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use extracto_core::Category;

    #[test]
    fn test_semicolon_statement() {
        let text = "Fecha;Concepto;Importe\n01/01/2024;Venta TPV;150,00\n02/01/2024;Nomina Enero;-800,00\n";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].category, Some(Category::Sale));
        assert_eq!(txns[0].amount, 150.0);
        assert_eq!(txns[1].category, Some(Category::Payroll));
        assert_eq!(txns[1].amount, -800.0);
        assert_eq!(txns[1].id, 1);
    }

    #[test]
    fn test_preamble_is_skipped() {
        let text = "\
Titular: Bar La Esquina SL
Cuenta: ES12 0000 0000 0000 0000

Fecha operación;Concepto;Importe;Saldo
03/02/2024;Compra Makro;-230,40;1.769,60
";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "03/02/2024");
        assert_eq!(txns[0].category, Some(Category::RawMaterial));
        assert_eq!(txns[0].amount, -230.4);
    }

    #[test]
    fn test_tab_fallback_header_in_any_order() {
        let text = "Importe\tFecha valor\tDescripción\n-45,10\t04/02/2024\tRecibo luz\n";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].concept, "Recibo luz");
        assert_eq!(txns[0].date, "04/02/2024");
        assert_eq!(txns[0].amount, -45.1);
        assert_eq!(txns[0].category, Some(Category::Overhead));
    }

    #[test]
    fn test_header_not_found() {
        let text = "just,some,values\n1,2,3\n";
        assert_eq!(parse_statement(text), Err(IngestionError::HeaderNotFound));
        assert_eq!(parse_statement(""), Err(IngestionError::HeaderNotFound));
    }

    #[test]
    fn test_missing_amount_column() {
        let text = "Fecha\tConcepto\tSaldo\n01/01/2024\tVenta\t10\n";
        assert_eq!(
            parse_statement(text),
            Err(IngestionError::MissingColumns {
                missing: vec![Column::Amount]
            })
        );
    }

    #[test]
    fn test_blank_rows_are_dropped_but_keep_ids_in_file_order() {
        let text = "Fecha;Concepto;Importe\n;;\n01/01/2024;Cobro;10\n\n02/01/2024;;0\n03/01/2024;;5\n";
        let txns = parse_statement(text).unwrap();
        // ";;" and "02/01/2024;;0" have no concept and a zero amount
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].id, 1);
        assert_eq!(txns[1].id, 3);
        assert_eq!(txns[1].concept, "");
        assert_eq!(txns[1].amount, 5.0);
    }

    #[test]
    fn test_short_rows_read_missing_cells_as_empty() {
        let text = "Fecha;Concepto;Importe\n05/01/2024;Bizum Pedro\n";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, 0.0);
        assert_eq!(txns[0].category, None);
        assert!(!txns[0].auto_categorized);
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let text = "Fecha,Concepto,Importe\n06/01/2024,\"Proveedor bebidas, SL\",\"-1,234.50\"\n";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns[0].concept, "Proveedor bebidas, SL");
        assert_eq!(txns[0].amount, -1234.5);
        assert_eq!(txns[0].category, Some(Category::RawMaterial));
    }

    #[test]
    fn test_concept_is_repaired_before_classification() {
        let text = "Fecha;Concepto;Importe\n31/01/2024;N\u{fffd}mina enero;-1.100,00\n";
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns[0].concept, "Nomina enero");
        assert_eq!(txns[0].category, Some(Category::Payroll));
    }

    #[test]
    fn test_strict_amounts() {
        let text = "Fecha;Concepto;Importe\n01/01/2024;Cobro;10\n02/01/2024;Pago;abc\n";
        let rules = RuleSet::default();
        let parser = StatementParser::new(&rules).with_options(ParseOptions {
            strict_amounts: true,
        });
        assert_eq!(
            parser.parse(text),
            Err(IngestionError::InvalidAmount {
                line: 3,
                raw: "abc".to_string()
            })
        );

        // default mode reads it as zero
        let txns = parse_statement(text).unwrap();
        assert_eq!(txns[1].amount, 0.0);
    }

    #[test]
    fn test_custom_rules() {
        let rules = RuleSet::default()
            .with_patterns(Category::Payroll, ["finiquito"])
            .unwrap();
        let text = "Fecha;Concepto;Importe\n01/03/2024;Finiquito Ana;-400\n";
        let txns = StatementParser::new(&rules).parse(text).unwrap();
        assert_eq!(txns[0].category, Some(Category::Payroll));
    }

    #[test]
    fn test_split_fields_delimiters() {
        assert_eq!(split_fields("a\tb;c"), vec!["a", "b;c"]);
        assert_eq!(split_fields("a; b ;c"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a,b"), vec!["a", "b"]);
        // unbalanced quote: plain split
        assert_eq!(split_fields("a,\"b,c"), vec!["a", "\"b", "c"]);
    }
}
