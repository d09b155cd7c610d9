use std::io::Read;

use thiserror::Error;

use concilia_core::{parse_day_first, Money, PayableRecord};

/// Required ledger columns, in the order they are looked up.
const REQUIRED_COLUMNS: [&str; 5] = [
    "Empresa",
    "Fornecedor",
    "Data Vencimento",
    "Valor",
    "Código",
];

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("No data rows")]
    NoDataRows,
}

/// Positions of the required columns within the header row.
struct ColumnIndex {
    payer: usize,
    payee: usize,
    due_date: usize,
    amount: usize,
    code: usize,
}

impl ColumnIndex {
    /// Schema validation happens here, before any row is read — a missing
    /// column is fatal for the whole input.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LedgerError> {
        let find = |name: &str| -> Result<usize, LedgerError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LedgerError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            payer: find(REQUIRED_COLUMNS[0])?,
            payee: find(REQUIRED_COLUMNS[1])?,
            due_date: find(REQUIRED_COLUMNS[2])?,
            amount: find(REQUIRED_COLUMNS[3])?,
            code: find(REQUIRED_COLUMNS[4])?,
        })
    }
}

/// Parse an accounts-payable ledger from `;`-delimited CSV.
///
/// Per-row issues stay per-row: an unparseable amount becomes zero, an
/// unparseable due date becomes unknown. Only schema problems abort.
pub fn parse_ledger<R: Read>(data: R) -> Result<Vec<PayableRecord>, LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .flexible(true)
        .from_reader(data);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut payables = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.is_empty() {
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let amount = Money::parse_brl(field(columns.amount)).unwrap_or_else(|| {
            tracing::warn!(
                "unparseable ledger amount {:?} for code {:?}, coercing to zero",
                field(columns.amount),
                field(columns.code)
            );
            Money::zero()
        });

        payables.push(PayableRecord {
            payer: field(columns.payer).to_string(),
            payee: field(columns.payee).to_string(),
            due_date: parse_day_first(field(columns.due_date)),
            amount,
            code: field(columns.code).to_string(),
        });
    }

    if payables.is_empty() {
        return Err(LedgerError::NoDataRows);
    }

    Ok(payables)
}
