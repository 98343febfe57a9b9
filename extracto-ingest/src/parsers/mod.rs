//! Statement parsers

pub mod delimited;

pub use delimited::{ColumnMap, ParseOptions, StatementParser, parse_statement, split_fields};
