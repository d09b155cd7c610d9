pub mod export;
pub mod parse;

pub use export::{write_payables, write_receipts, write_reconciled};
pub use parse::{parse_ledger, LedgerError};
