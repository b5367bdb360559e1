//! Command handlers

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use jiff::Timestamp;
use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::{info, warn};

use yatai::{
    catalog::Catalog,
    fixtures::{FixtureError, festival_catalog, load_catalog},
    history::{HistoryEntry, HistoryError, JsonFileStore, OrderHistory},
    orders::{Order, OrderError, parse_line},
    receipt::ReceiptError,
    solvers::{SolverError, compute_totals},
};

use crate::config::{Cli, Command, HistoryCommand};

/// Command Errors
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// The catalog could not be loaded
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// An order line could not be parsed
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The order could not be priced
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// The receipt could not be written
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// The history could not be saved or exported
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Output error
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

/// Run the selected command, writing its output to `out`.
pub(crate) fn run(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => festival_catalog()?,
    };

    let store = JsonFileStore::new(&cli.history);

    match &cli.command {
        Command::Menu => write_menu(out, &catalog),
        Command::Quote { items, record } => {
            let lines = items
                .iter()
                .map(|line| parse_line(line))
                .collect::<Result<Vec<_>, _>>()?;

            let record = record.then_some((&store, cli.history_limit));

            quote(out, &catalog, Order::from_input(lines), record)
        }
        Command::History { action } => {
            let mut history = OrderHistory::load(&store, cli.history_limit);

            match action {
                HistoryCommand::List => write_history(out, &catalog, &history),
                HistoryCommand::Export { out: Some(path) } => export(path, &history),
                HistoryCommand::Export { out: None } => Ok(history.write_csv(&mut *out)?),
                HistoryCommand::Clear => {
                    history.clear();
                    history.save(&store)?;

                    writeln!(out, "History cleared.")?;

                    Ok(())
                }
            }
        }
    }
}

fn write_menu(out: &mut impl Write, catalog: &Catalog<'_>) -> Result<(), CliError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Price"]);

    for (_, product) in catalog.iter() {
        builder.push_record([
            product.id.clone(),
            product.name.clone(),
            product.category.to_string(),
            product.price.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

fn quote(
    out: &mut impl Write,
    catalog: &Catalog<'_>,
    order: Order,
    record: Option<(&JsonFileStore, usize)>,
) -> Result<(), CliError> {
    if order.is_empty() {
        writeln!(out, "No items ordered.")?;

        return Ok(());
    }

    let receipt = compute_totals(catalog, &order)?;

    receipt.write_to(&mut *out, catalog)?;

    if let Some((store, limit)) = record {
        let mut history = OrderHistory::load(store, limit);
        history.record(HistoryEntry::new(Timestamp::now(), order, &receipt));

        match history.save(store) {
            Ok(()) => info!(entries = history.len(), "order recorded"),
            Err(err) => warn!(error = %err, "failed to save order history"),
        }
    }

    Ok(())
}

fn write_history(
    out: &mut impl Write,
    catalog: &Catalog<'_>,
    history: &OrderHistory,
) -> Result<(), CliError> {
    if history.is_empty() {
        writeln!(out, "No orders recorded.")?;

        return Ok(());
    }

    let currency = catalog.currency();
    let mut builder = Builder::default();

    builder.push_record(["Time", "Subtotal", "Discount", "Final", "Sets"]);

    for entry in history.entries() {
        builder.push_record([
            entry.timestamp.to_string(),
            Money::from_minor(entry.subtotal, currency).to_string(),
            format!("-{}", Money::from_minor(entry.discount, currency)),
            Money::from_minor(entry.total, currency).to_string(),
            entry.summarized_sets().join(" / "),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

fn export(path: &Path, history: &OrderHistory) -> Result<(), CliError> {
    let mut file = BufWriter::new(File::create(path)?);

    history.write_csv(&mut file)?;
    file.flush()?;

    info!(path = %path.display(), entries = history.len(), "history exported");

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    fn run_with(args: &[&str]) -> TestResult<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();

        run(&cli, &mut out)?;

        Ok(String::from_utf8(out)?)
    }

    fn run_in(history: &str, args: &[&str]) -> TestResult<String> {
        let mut full = vec!["yatai", "--history", history];
        full.extend_from_slice(args);

        run_with(&full)
    }

    #[test]
    fn menu_lists_every_product() -> TestResult {
        let rendered = run_with(&["yatai", "menu"])?;
        let catalog = festival_catalog()?;

        for (_, product) in catalog.iter() {
            assert!(
                rendered.contains(&product.name),
                "{} missing from {rendered}",
                product.name
            );
        }

        Ok(())
    }

    #[test]
    fn quote_prints_the_receipt() -> TestResult {
        let rendered = run_with(&["yatai", "quote", "shikuwasa=1", "butaman=2"])?;

        assert!(
            rendered.contains("飲み物入り3品セット (-200)"),
            "{rendered}"
        );
        assert!(rendered.contains("Total:"), "{rendered}");

        Ok(())
    }

    #[test]
    fn quote_drops_non_positive_quantities() -> TestResult {
        let rendered = run_with(&["yatai", "quote", "butaman=3", "shikaman=-1"])?;

        assert!(rendered.contains("食品3品セット (-150)"), "{rendered}");
        assert!(!rendered.contains("鹿まん"), "{rendered}");

        Ok(())
    }

    #[test]
    fn quote_without_items_prints_empty_result() -> TestResult {
        let rendered = run_with(&["yatai", "quote", "butaman=0", "wonglok=-2"])?;

        assert_eq!(rendered, "No items ordered.\n");

        Ok(())
    }

    #[test]
    fn quote_rejects_unknown_items() -> TestResult {
        let cli = Cli::try_parse_from(["yatai", "quote", "takoyaki=1"])?;

        let result = run(&cli, &mut Vec::new());

        assert!(matches!(result, Err(CliError::Solver(SolverError::UnknownItem(_)))));

        Ok(())
    }

    #[test]
    fn quote_rejects_non_integer_quantities() -> TestResult {
        let cli = Cli::try_parse_from(["yatai", "quote", "butaman=1.5"])?;

        let result = run(&cli, &mut Vec::new());

        assert!(matches!(result, Err(CliError::Order(_))));

        Ok(())
    }

    #[test]
    fn recorded_quotes_can_be_listed_exported_and_cleared() -> TestResult {
        let dir = tempfile::tempdir()?;
        let history = dir.path().join("history.json");
        let csv = dir.path().join("history.csv");
        let history = history.to_str().ok_or("non-utf8 temp path")?;
        let csv_path = csv.to_str().ok_or("non-utf8 temp path")?;

        run_in(history, &["quote", "butaman=3", "--record"])?;

        let listed = run_in(history, &["history", "list"])?;
        assert!(listed.contains("食品3品セット (-150)"), "{listed}");

        run_in(history, &["history", "export", "--out", csv_path])?;
        let exported = std::fs::read_to_string(&csv)?;
        assert!(exported.starts_with('\u{feff}'), "{exported}");
        assert!(exported.contains(r#""750","150","600""#), "{exported}");

        run_in(history, &["history", "clear"])?;
        let listed = run_in(history, &["history", "list"])?;
        assert_eq!(listed, "No orders recorded.\n");

        Ok(())
    }
}
