use std::fmt;
use thiserror::Error;

/// The three columns every statement must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Concept,
    Amount,
}

impl Column {
    /// Name shown to the user
    pub fn name(&self) -> &'static str {
        match self {
            Column::Date => "Fecha",
            Column::Concept => "Concepto",
            Column::Amount => "Importe",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an uploaded statement was rejected. A rejected statement yields no transactions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestionError {
    #[error("header row not found: expected Fecha, Concepto and Importe columns")]
    HeaderNotFound,
    #[error("missing required columns: {}", join_names(.missing))]
    MissingColumns { missing: Vec<Column> },
    /// Only raised when strict amount parsing is enabled
    #[error("invalid amount '{raw}' on line {line}")]
    InvalidAmount { line: usize, raw: String },
}

impl IngestionError {
    /// Title for a dismissible notice
    pub fn title(&self) -> &'static str {
        match self {
            IngestionError::HeaderNotFound => "No encontramos las columnas necesarias",
            IngestionError::MissingColumns { .. } => "Faltan columnas obligatorias",
            IngestionError::InvalidAmount { .. } => "Importe no válido",
        }
    }

    /// Notice body as an HTML fragment
    pub fn message_html(&self) -> String {
        const ADVICE: &str =
            "Por favor, revisa el archivo o descarga el extracto completo desde tu banco.";
        match self {
            IngestionError::HeaderNotFound => format!(
                "Tu archivo debe contener estas columnas: <strong>Fecha</strong>, \
                 <strong>Concepto</strong> e <strong>Importe</strong>. {ADVICE}"
            ),
            IngestionError::MissingColumns { missing } => format!(
                "No encontramos: <strong>{}</strong>. {ADVICE}",
                join_names(missing)
            ),
            IngestionError::InvalidAmount { line, raw } => format!(
                "La línea {line} tiene un importe que no sabemos leer: <strong>{}</strong>. {ADVICE}",
                escape_html(raw)
            ),
        }
    }
}

fn join_names(columns: &[Column]) -> String {
    columns.iter().map(Column::name).collect::<Vec<_>>().join(", ")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_names() {
        let err = IngestionError::MissingColumns {
            missing: vec![Column::Date, Column::Amount],
        };
        assert_eq!(err.to_string(), "missing required columns: Fecha, Importe");
        assert_eq!(err.title(), "Faltan columnas obligatorias");
        assert!(err.message_html().starts_with("No encontramos: <strong>Fecha, Importe</strong>."));
    }

    #[test]
    fn test_header_not_found_notice() {
        let err = IngestionError::HeaderNotFound;
        assert_eq!(err.title(), "No encontramos las columnas necesarias");
        assert!(err.message_html().contains("<strong>Concepto</strong>"));
    }

    #[test]
    fn test_invalid_amount_is_escaped() {
        let err = IngestionError::InvalidAmount {
            line: 4,
            raw: "<b>12</b>".to_string(),
        };
        assert!(err.message_html().contains("&lt;b&gt;12&lt;/b&gt;"));
        assert_eq!(err.to_string(), "invalid amount '<b>12</b>' on line 4");
    }
}
