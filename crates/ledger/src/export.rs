use std::io::Write;

use chrono::NaiveDate;

use concilia_core::{PayableRecord, ReceiptRecord};
use concilia_reconcile::Association;

/// Report CSVs use `;` as the field separator, matching the ledger input.
const DELIMITER: u8 = b';';

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(DELIMITER).from_writer(out)
}

fn date_field(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// Full reconciliation view: payable fields, receipt fields (blank when
/// unmatched) and the fuzzy score. Header names are the internal canonical
/// field names, not display names.
pub fn write_reconciled<W: Write>(out: W, rows: &[Association]) -> Result<(), csv::Error> {
    let mut w = writer(out);
    w.write_record([
        "payer",
        "payee",
        "due_date",
        "amount",
        "code",
        "receipt_payer",
        "receipt_payee",
        "operation_date",
        "document_number",
        "receipt_amount",
        "score",
    ])?;

    for assoc in rows {
        let p = &assoc.payable;
        let (r_payer, r_payee, r_date, r_doc, r_amount) = match &assoc.receipt {
            Some(r) => (
                r.payer.clone(),
                r.payee.clone(),
                date_field(r.operation_date),
                r.document_number.clone(),
                format!("{:.2}", r.amount.amount()),
            ),
            None => Default::default(),
        };
        let score = assoc.score.map(|s| s.to_string()).unwrap_or_default();
        let due = date_field(p.due_date);
        let amount = format!("{:.2}", p.amount.amount());

        w.write_record([
            p.payer.as_str(),
            p.payee.as_str(),
            due.as_str(),
            amount.as_str(),
            p.code.as_str(),
            r_payer.as_str(),
            r_payee.as_str(),
            r_date.as_str(),
            r_doc.as_str(),
            r_amount.as_str(),
            score.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Payables-without-receipt view.
pub fn write_payables<W: Write>(out: W, rows: &[PayableRecord]) -> Result<(), csv::Error> {
    let mut w = writer(out);
    w.write_record(["payer", "payee", "due_date", "amount", "code"])?;
    for p in rows {
        let due = date_field(p.due_date);
        let amount = format!("{:.2}", p.amount.amount());
        w.write_record([
            p.payer.as_str(),
            p.payee.as_str(),
            due.as_str(),
            amount.as_str(),
            p.code.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Receipts-without-payable view.
pub fn write_receipts<W: Write>(out: W, rows: &[ReceiptRecord]) -> Result<(), csv::Error> {
    let mut w = writer(out);
    w.write_record([
        "payer",
        "payee",
        "operation_date",
        "document_number",
        "amount",
        "source_page_index",
    ])?;
    for r in rows {
        let date = date_field(r.operation_date);
        let amount = format!("{:.2}", r.amount.amount());
        let page = r.source_page_index.to_string();
        w.write_record([
            r.payer.as_str(),
            r.payee.as_str(),
            date.as_str(),
            r.document_number.as_str(),
            amount.as_str(),
            page.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
