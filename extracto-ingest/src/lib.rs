//! extracto-ingest: statement ingestion (encoding repair, amount normalization,
//! header detection) producing categorized transactions.

pub mod amount;
pub mod encoding;
pub mod error;
pub mod parsers;

pub use amount::{AmountError, parse_amount, parse_amount_strict};
pub use encoding::{decode_bytes, repair};
pub use error::{Column, IngestionError};
pub use parsers::{ParseOptions, StatementParser, parse_statement};
