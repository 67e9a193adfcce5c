//! Seeds the bookstore tables from a directory of JSON fixture files.
//!
//! A run wipes all five tables, then reads `publisher.json`, `book.json`,
//! `shop.json`, `stock.json` and `sale.json` in that order and inserts what it
//! read in a single transaction. A file that is missing or malformed is logged
//! and skipped; the rest still load. A constraint violation while inserting
//! fails the whole run.

pub mod error;

pub use error::FixtureError;

use core_types::{EntityKind, FixtureSet, TableCounts};
use database::Inventory;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one fixture file.
#[derive(Debug)]
pub enum FileOutcome {
    Loaded {
        kind: EntityKind,
        path: PathBuf,
        rows: usize,
    },
    Skipped {
        kind: EntityKind,
        path: PathBuf,
        error: FixtureError,
    },
}

impl FileOutcome {
    pub fn kind(&self) -> EntityKind {
        match self {
            FileOutcome::Loaded { kind, .. } | FileOutcome::Skipped { kind, .. } => *kind,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FileOutcome::Loaded { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Loaded { path, rows, .. } => {
                write!(f, "Loaded {} rows from {}", rows, path.display())
            }
            FileOutcome::Skipped { path, error, .. } => {
                write!(f, "Failed to load data from {}: {}", path.display(), error)
            }
        }
    }
}

/// The result of a completed load run.
#[derive(Debug)]
pub struct LoadReport {
    /// One entry per fixture file, in load order.
    pub outcomes: Vec<FileOutcome>,
    /// Row counts of every table after the commit.
    pub counts: TableCounts,
}

impl LoadReport {
    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_loaded())
    }
}

/// Reads one fixture document: a UTF-8 JSON array of objects shaped like `T`.
pub fn load_fixture<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FixtureError> {
    let raw = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| FixtureError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses one entity's fixture file into its slot of `fixtures`, returning the row count.
fn read_into(fixtures: &mut FixtureSet, kind: EntityKind, path: &Path) -> Result<usize, FixtureError> {
    let rows = match kind {
        EntityKind::Publisher => {
            fixtures.publishers = load_fixture(path)?;
            fixtures.publishers.len()
        }
        EntityKind::Book => {
            fixtures.books = load_fixture(path)?;
            fixtures.books.len()
        }
        EntityKind::Shop => {
            fixtures.shops = load_fixture(path)?;
            fixtures.shops.len()
        }
        EntityKind::Stock => {
            fixtures.stocks = load_fixture(path)?;
            fixtures.stocks.len()
        }
        EntityKind::Sale => {
            fixtures.sales = load_fixture(path)?;
            fixtures.sales.len()
        }
    };
    Ok(rows)
}

/// Reads all five fixture files from `dir`, skipping any that fail.
///
/// `on_file` sees each outcome as soon as its file has been read, before
/// anything is inserted.
pub fn read_fixture_dir<F>(dir: &Path, mut on_file: F) -> (FixtureSet, Vec<FileOutcome>)
where
    F: FnMut(&FileOutcome),
{
    let mut fixtures = FixtureSet::default();
    let mut outcomes = Vec::with_capacity(EntityKind::LOAD_ORDER.len());

    for kind in EntityKind::LOAD_ORDER {
        let path = dir.join(kind.fixture_file_name());
        let outcome = match read_into(&mut fixtures, kind, &path) {
            Ok(rows) => {
                tracing::info!(file = %path.display(), rows, "Fixture file parsed.");
                FileOutcome::Loaded { kind, path, rows }
            }
            Err(error) => {
                tracing::error!(file = %path.display(), %error, "Skipping fixture file.");
                FileOutcome::Skipped { kind, path, error }
            }
        };
        on_file(&outcome);
        outcomes.push(outcome);
    }

    (fixtures, outcomes)
}

/// Replaces the contents of every table with the fixtures found in `dir`.
///
/// The wipe is committed on its own before any file is read, so a run that
/// later fails on a constraint leaves the tables empty rather than half-old.
pub async fn run<S: Inventory>(store: &S, dir: &Path) -> Result<LoadReport, FixtureError> {
    run_with(store, dir, |_| {}).await
}

/// Like [`run`], but hands every per-file outcome to `on_file` as it happens.
///
/// The callback fires even when the insert later fails, so callers can still
/// show which files were read.
pub async fn run_with<S, F>(store: &S, dir: &Path, on_file: F) -> Result<LoadReport, FixtureError>
where
    S: Inventory,
    F: FnMut(&FileOutcome),
{
    store.clear_all().await?;

    let (fixtures, outcomes) = read_fixture_dir(dir, on_file);
    if fixtures.is_empty() {
        tracing::warn!(dir = %dir.display(), "No fixture rows found; tables stay empty.");
    }

    store.insert_fixtures(&fixtures).await?;
    let counts = store.table_counts().await?;
    tracing::info!(?counts, "Fixtures committed.");

    Ok(LoadReport { outcomes, counts })
}
