use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use extracto_core::Category;
use extracto_finance::{DateOrdering, ReviewSession};
use extracto_ingest::{ParseOptions, StatementParser, decode_bytes};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::report::{AnalysisReport, render_text};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Bank statement export (CSV, TSV or semicolon-separated)
    pub file: PathBuf,

    /// Manual category for one transaction, e.g. `--assign 5=other` (repeatable)
    #[arg(long = "assign", value_name = "ID=CATEGORY")]
    pub assignments: Vec<String>,

    /// Run the validation gate and print stats and daily sales
    #[arg(long)]
    pub validate: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail on unreadable amounts instead of reading them as zero
    #[arg(long)]
    pub strict_amounts: bool,

    /// Order daily sales by parsed calendar date
    #[arg(long)]
    pub calendar_dates: bool,
}

pub fn run(args: AnalyzeArgs, cfg: &Config) -> Result<()> {
    if !args.file.exists() {
        bail!("Statement not found: {}", args.file.display());
    }

    let bytes = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let text = decode_bytes(&bytes);

    let rules = cfg.rule_set()?;
    let options = ParseOptions {
        strict_amounts: args.strict_amounts || cfg.report.strict_amounts,
    };
    let txns = StatementParser::new(&rules)
        .with_options(options)
        .parse(&text)
        .map_err(|e| anyhow!("{}: {e}", e.title()))
        .with_context(|| format!("parsing {}", args.file.display()))?;
    tracing::info!("parsed {} transactions from {}", txns.len(), args.file.display());

    let ordering = if args.calendar_dates {
        DateOrdering::Calendar
    } else {
        cfg.report.date_ordering
    };
    let mut session = ReviewSession::new(txns).with_date_ordering(ordering);

    for raw in &args.assignments {
        let (id, category) = parse_assignment(raw)?;
        session.assign(id, category)?;
    }

    // Print the report either way; a failed gate still exits non-zero.
    let gate = if args.validate {
        session.validate()
    } else {
        Ok(())
    };

    let report = AnalysisReport::from_session(&session);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    gate?;
    Ok(())
}

/// `"5=other"` -> `(5, Category::Other)`
pub fn parse_assignment(raw: &str) -> Result<(u32, Category)> {
    let (id, category) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected ID=CATEGORY, got '{raw}'"))?;
    let id: u32 = id
        .trim()
        .parse()
        .with_context(|| format!("invalid transaction id in '{raw}'"))?;
    let category: Category = category.trim().parse().with_context(|| {
        let tokens: Vec<&str> = Category::ALL.iter().map(Category::token).collect();
        format!("expected one of: {}", tokens.join(", "))
    })?;
    Ok((id, category))
}
