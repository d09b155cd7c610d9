use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use concilia_core::ReceiptRecord;
use concilia_extract::{artifact_file_name, scan_source, PageSource, PdfSource};
use concilia_ledger::{parse_ledger, write_payables, write_receipts, write_reconciled};
use concilia_reconcile::{
    build_report, resolve, GroupKey, MapDecider, MatchEngine, MatchStrategy,
    DEFAULT_FUZZY_THRESHOLD,
};

/// Reconcile bank receipt PDFs against an accounts-payable ledger.
#[derive(Parser)]
#[command(name = "concilia", version, about, long_about = None)]
struct Cli {
    /// Accounts-payable ledger (`;`-delimited CSV)
    #[arg(long)]
    ledger: PathBuf,

    /// Receipt PDF document(s), one or more
    #[arg(required = true)]
    receipts: Vec<PathBuf>,

    /// Matching strategy
    #[arg(long, value_enum, default_value = "fuzzy")]
    strategy: Strategy,

    /// Similarity threshold for the fuzzy strategy (0–100)
    #[arg(long, default_value_t = DEFAULT_FUZZY_THRESHOLD,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: u8,

    /// JSON decision map for ambiguous groups, e.g. {"payable:C1": 0}
    #[arg(long)]
    decisions: Option<PathBuf>,

    /// Directory the report CSVs are written to
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Also write one single-page PDF per extracted receipt
    #[arg(long)]
    split: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Strategy {
    Exact,
    Fuzzy,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // ── Inputs ────────────────────────────────────────────────────────────────
    let ledger_file = File::open(&cli.ledger)
        .with_context(|| format!("Failed to open ledger {}", cli.ledger.display()))?;
    let payables = parse_ledger(ledger_file)
        .with_context(|| format!("Invalid ledger {}", cli.ledger.display()))?;
    tracing::info!("{} payable(s) loaded from {}", payables.len(), cli.ledger.display());

    let mut documents: Vec<(PathBuf, PdfSource, Vec<ReceiptRecord>)> = Vec::new();
    for path in &cli.receipts {
        let source = PdfSource::open(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let scan = scan_source(&source)?;
        if !scan.found_any() {
            tracing::warn!(
                "no receipt found in {} ({} page(s) scanned)",
                path.display(),
                scan.pages_scanned
            );
        } else {
            tracing::info!(
                "{}: {} receipt(s), {} page(s) skipped",
                path.display(),
                scan.records.len(),
                scan.misses
            );
        }
        documents.push((path.clone(), source, scan.records));
    }

    let receipts: Vec<ReceiptRecord> = documents
        .iter()
        .flat_map(|(_, _, records)| records.iter().cloned())
        .collect();

    // ── Match ─────────────────────────────────────────────────────────────────
    let strategy = match cli.strategy {
        Strategy::Exact => MatchStrategy::Exact,
        Strategy::Fuzzy => MatchStrategy::Fuzzy {
            threshold: cli.threshold,
        },
    };
    let candidates = MatchEngine::new(strategy).find_candidates(&payables, &receipts);

    // ── Resolve ───────────────────────────────────────────────────────────────
    let mut decider = load_decisions(cli.decisions.as_deref())?;
    let resolution = resolve(candidates, &mut decider);

    if !resolution.is_complete() {
        println!("{}", serde_json::to_string_pretty(&resolution.pending)?);
        anyhow::bail!(
            "{} ambiguous group(s) need a decision — re-run with --decisions pointing \
             at a map of group key to chosen index",
            resolution.pending.len()
        );
    }

    // ── Report ────────────────────────────────────────────────────────────────
    let report = build_report(&resolution.resolved, &receipts);
    std::fs::create_dir_all(&cli.out)?;

    write_reconciled(
        File::create(cli.out.join("tabela_conciliada.csv"))?,
        &report.reconciled,
    )?;
    write_payables(
        File::create(cli.out.join("contas_sem_comprovante.csv"))?,
        &report.payables_without_receipt,
    )?;
    write_receipts(
        File::create(cli.out.join("pagamentos_sem_conta.csv"))?,
        &report.receipts_without_payable,
    )?;

    tracing::info!(
        "reconciled {} row(s): {} matched, {} payable(s) without receipt, {} receipt(s) without payable",
        report.reconciled.len(),
        report.reconciled.iter().filter(|a| a.is_matched()).count(),
        report.payables_without_receipt.len(),
        report.receipts_without_payable.len(),
    );

    if cli.split {
        split_receipts(&documents, &cli.out)?;
    }

    Ok(())
}

/// Load the `GroupKey → chosen index` map, when one was supplied.
fn load_decisions(path: Option<&std::path::Path>) -> anyhow::Result<MapDecider> {
    let Some(path) = path else {
        return Ok(MapDecider::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open decisions {}", path.display()))?;
    let raw: HashMap<String, usize> = serde_json::from_reader(file)
        .with_context(|| format!("Invalid decisions JSON {}", path.display()))?;

    let mut decider = MapDecider::default();
    for (key, index) in raw {
        let key: GroupKey = key
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{e} (in {})", path.display()))?;
        decider.insert(key, index);
    }
    Ok(decider)
}

/// Write one single-page PDF artifact per extracted receipt.
fn split_receipts(
    documents: &[(PathBuf, PdfSource, Vec<ReceiptRecord>)],
    out: &std::path::Path,
) -> anyhow::Result<()> {
    for (path, source, records) in documents {
        for record in records {
            let bytes = source
                .split_page(record.source_page_index)
                .with_context(|| format!("Failed to split {}", path.display()))?;
            let name = artifact_file_name(record);
            std::fs::write(out.join(&name), bytes)?;
            tracing::debug!("wrote {name}");
        }
    }
    Ok(())
}
