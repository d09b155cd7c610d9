use std::sync::OnceLock;

use regex::Regex;

use concilia_core::{parse_day_first, Money, ReceiptRecord};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// The five anchors of a bank receipt page. Each is independent; all five
// must hit for the page to count as a receipt.
re!(re_payer,
    r"Empresa:\s*([^|\n]+?)\s*\|\s*CNPJ:");
re!(re_payee,
    r"Nome do favorecido:\s*([^\n]+)");
re!(re_operation_date,
    r"Data da operação:\s*(\d{2}/\d{2}/\d{4})");
re!(re_control_number,
    r"N[°º] de controle:\s*(\d+)\s*\|");
re!(re_amount,
    r"Valor\s*R\$\s*([\d.,]+)");

// ── Public extraction API ─────────────────────────────────────────────────────

/// Parse one page's raw text into a [`ReceiptRecord`].
///
/// Returns `None` when any of the five anchors is missing — the page is
/// treated as "not a receipt page", not as an error. An amount that anchors
/// but fails to parse is coerced to zero rather than aborting the page; such
/// receipts can only ever pair with zero-amount payables downstream.
pub fn extract_receipt(page_index: usize, text: &str) -> Option<ReceiptRecord> {
    let payer = re_payer().captures(text)?.get(1)?.as_str().trim().to_string();
    let payee = re_payee().captures(text)?.get(1)?.as_str().trim().to_string();
    let date_str = re_operation_date().captures(text)?.get(1)?.as_str();
    let document_number = re_control_number()
        .captures(text)?
        .get(1)?
        .as_str()
        .to_string();
    let amount_str = re_amount().captures(text)?.get(1)?.as_str();

    let amount = Money::parse_brl(amount_str).unwrap_or_else(Money::zero);
    let operation_date = parse_day_first(date_str);

    Some(ReceiptRecord {
        payer,
        payee,
        operation_date,
        document_number,
        amount,
        source_page_index: page_index,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
