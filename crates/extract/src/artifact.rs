use concilia_core::ReceiptRecord;

/// File name for a receipt's single-page PDF artifact:
/// `{payer}_para_{payee}_{date}_R${amount}.pdf`, spaces replaced by `_` and
/// the date rendered day-first with `-` instead of `/`.
pub fn artifact_file_name(record: &ReceiptRecord) -> String {
    let payer = record.payer.replace(' ', "_");
    let payee = record.payee.replace(' ', "_");
    let date = record
        .operation_date
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "sem-data".to_string());
    format!(
        "{payer}_para_{payee}_{date}_R${:.2}.pdf",
        record.amount.amount()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use concilia_core::Money;
    use rust_decimal::Decimal;

    fn record(payer: &str, payee: &str) -> ReceiptRecord {
        ReceiptRecord {
            payer: payer.to_string(),
            payee: payee.to_string(),
            operation_date: NaiveDate::from_ymd_opt(2024, 2, 7),
            document_number: "42".to_string(),
            amount: Money::from_decimal(Decimal::new(123456, 2)),
            source_page_index: 0,
        }
    }

    #[test]
    fn spaces_become_underscores() {
        let name = artifact_file_name(&record("ACME LTDA", "Bob Fornecedores"));
        assert_eq!(name, "ACME_LTDA_para_Bob_Fornecedores_07-02-2024_R$1234.56.pdf");
    }

    #[test]
    fn unknown_date_placeholder() {
        let mut r = record("A", "B");
        r.operation_date = None;
        assert!(artifact_file_name(&r).contains("_sem-data_"));
    }
}
