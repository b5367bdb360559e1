//! Order History
//!
//! A bounded, newest-first log of priced orders, persisted on a best-effort basis.

use std::{
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    orders::Order,
    receipt::{Receipt, summarize},
};

/// Default number of entries kept.
pub const MAX_HISTORY: usize = 50;

/// Column headers of the CSV export.
pub const CSV_HEADER: [&str; 6] = [
    "timestamp",
    "subtotal",
    "discount",
    "final",
    "applied_sets",
    "order",
];

/// History Errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// IO error reading or writing history
    #[error("History IO error: {0}")]
    Io(#[from] io::Error),

    /// History could not be encoded or decoded
    #[error("History JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One priced order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the order was priced
    pub timestamp: Timestamp,

    /// Snapshot of the order
    pub order: Order,

    /// Subtotal in minor units
    pub subtotal: i64,

    /// Discount in minor units
    pub discount: i64,

    /// Amount paid in minor units
    #[serde(rename = "final")]
    pub total: i64,

    /// Applied bundle labels, once per application
    pub applied_sets: Vec<String>,
}

impl HistoryEntry {
    /// Snapshot an order and its receipt.
    pub fn new(timestamp: Timestamp, order: Order, receipt: &Receipt<'_>) -> Self {
        Self {
            timestamp,
            order,
            subtotal: receipt.subtotal().to_minor_units(),
            discount: receipt.discount().to_minor_units(),
            total: receipt.total().to_minor_units(),
            applied_sets: receipt
                .applied_labels()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Applied labels with repeats collapsed to `label ×N`.
    pub fn summarized_sets(&self) -> Vec<String> {
        summarize(self.applied_sets.iter().map(String::as_str))
    }
}

/// Storage backend for history entries.
pub trait HistoryStore {
    /// Load all stored entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if stored entries exist but cannot be read.
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Replace the stored entries.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the entries cannot be written.
    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError>;
}

/// History stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)?;

        Ok(())
    }
}

/// Order History
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHistory {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl OrderHistory {
    /// Create an empty history keeping at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Create a history from newest-first entries, dropping any beyond `limit`.
    pub fn with_entries(mut entries: Vec<HistoryEntry>, limit: usize) -> Self {
        entries.truncate(limit);

        Self { entries, limit }
    }

    /// Load history from a store.
    ///
    /// Unreadable history is logged and treated as empty.
    pub fn load(store: &impl HistoryStore, limit: usize) -> Self {
        match store.load() {
            Ok(entries) => Self::with_entries(entries, limit),
            Err(err) => {
                warn!(error = %err, "failed to load order history, starting empty");
                Self::new(limit)
            }
        }
    }

    /// Save history to a store.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the store cannot be written.
    pub fn save(&self, store: &impl HistoryStore) -> Result<(), HistoryError> {
        store.save(&self.entries)
    }

    /// Record an entry as the newest, evicting the oldest beyond the limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Write the history as CSV, newest first.
    ///
    /// The output starts with a UTF-8 byte order mark and quotes every cell.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if an order cannot be encoded or the output cannot be written.
    pub fn write_csv(&self, mut out: impl io::Write) -> Result<(), HistoryError> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        rows.push(csv_row(CSV_HEADER));

        for entry in &self.entries {
            rows.push(csv_row([
                entry.timestamp.to_string(),
                entry.subtotal.to_string(),
                entry.discount.to_string(),
                entry.total.to_string(),
                entry.summarized_sets().join(" / "),
                serde_json::to_string(&entry.order)?,
            ]));
        }

        write!(out, "\u{feff}{}", rows.join("\n"))?;

        Ok(())
    }
}

impl Default for OrderHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

fn csv_row<S: AsRef<str>>(cells: impl IntoIterator<Item = S>) -> String {
    cells
        .into_iter()
        .map(|cell| format!("\"{}\"", cell.as_ref().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{catalog::Catalog, solvers::compute_totals};

    use super::*;

    fn entry(timestamp: &str, subtotal: i64) -> Result<HistoryEntry, jiff::Error> {
        Ok(HistoryEntry {
            timestamp: timestamp.parse::<Timestamp>()?,
            order: Order::new().with("butaman", 1),
            subtotal,
            discount: 0,
            total: subtotal,
            applied_sets: Vec::new(),
        })
    }

    #[test]
    fn entry_snapshots_receipt_labels() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new().with("butaman", 8);
        let receipt = compute_totals(&catalog, &order)?;

        let timestamp = "2024-08-01T10:00:00Z".parse::<Timestamp>()?;
        let entry = HistoryEntry::new(timestamp, order.clone(), &receipt);

        assert_eq!(entry.order, order);
        assert_eq!(entry.subtotal, 2000);
        assert_eq!(entry.discount, 400);
        assert_eq!(entry.total, 1600);
        assert_eq!(
            entry.summarized_sets(),
            ["食品3品セット (-150) ×2", "任意2品セット (-100)"]
        );

        Ok(())
    }

    #[test]
    fn record_keeps_newest_first_within_limit() -> TestResult {
        let mut history = OrderHistory::new(2);

        history.record(entry("2024-08-01T10:00:00Z", 100)?);
        history.record(entry("2024-08-01T11:00:00Z", 200)?);
        history.record(entry("2024-08-01T12:00:00Z", 300)?);

        let subtotals: Vec<i64> = history.entries().iter().map(|e| e.subtotal).collect();

        assert_eq!(subtotals, [300, 200]);
        assert_eq!(history.len(), 2);

        Ok(())
    }

    #[test]
    fn with_entries_truncates_to_limit() -> TestResult {
        let entries = vec![
            entry("2024-08-01T12:00:00Z", 300)?,
            entry("2024-08-01T11:00:00Z", 200)?,
            entry("2024-08-01T10:00:00Z", 100)?,
        ];

        let history = OrderHistory::with_entries(entries, 1);

        assert_eq!(history.entries().first().map(|e| e.subtotal), Some(300));
        assert_eq!(history.len(), 1);

        Ok(())
    }

    #[test]
    fn serialises_with_camel_case_keys() -> TestResult {
        let json = serde_json::to_value(entry("2024-08-01T10:00:00Z", 250)?)?;

        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": "2024-08-01T10:00:00Z",
                "order": { "butaman": 1 },
                "subtotal": 250,
                "discount": 0,
                "final": 250,
                "appliedSets": [],
            })
        );

        Ok(())
    }

    #[test]
    fn write_csv_quotes_every_cell() -> TestResult {
        let mut history = OrderHistory::default();
        history.record(HistoryEntry {
            timestamp: "2024-08-01T10:00:00Z".parse::<Timestamp>()?,
            order: Order::new().with("butaman", 2).with("wonglok", 3),
            subtotal: 1700,
            discount: 300,
            total: 1400,
            applied_sets: vec![
                "飲み物入り3品セット (-200)".to_string(),
                "任意2品セット (-100)".to_string(),
            ],
        });

        let mut out = Vec::new();
        history.write_csv(&mut out)?;

        assert_eq!(
            String::from_utf8(out)?,
            "\u{feff}\"timestamp\",\"subtotal\",\"discount\",\"final\",\"applied_sets\",\"order\"\n\
             \"2024-08-01T10:00:00Z\",\"1700\",\"300\",\"1400\",\
             \"飲み物入り3品セット (-200) / 任意2品セット (-100)\",\
             \"{\"\"butaman\"\":2,\"\"wonglok\"\":3}\""
        );

        Ok(())
    }

    #[test]
    fn json_file_store_round_trips() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("history.json"));

        let mut history = OrderHistory::load(&store, MAX_HISTORY);
        assert!(history.is_empty());

        history.record(entry("2024-08-01T10:00:00Z", 250)?);
        history.save(&store)?;

        assert_eq!(OrderHistory::load(&store, MAX_HISTORY), history);

        Ok(())
    }

    #[test]
    fn corrupt_history_loads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.json");
        fs::write(&path, "not json")?;
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load(), Err(HistoryError::Json(_))));
        assert!(OrderHistory::load(&store, MAX_HISTORY).is_empty());

        Ok(())
    }

    #[test]
    fn clear_removes_all_entries() -> TestResult {
        let mut history = OrderHistory::new(MAX_HISTORY);
        history.record(entry("2024-08-01T10:00:00Z", 250)?);

        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.limit(), MAX_HISTORY);

        Ok(())
    }
}
