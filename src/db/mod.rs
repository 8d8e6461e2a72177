//! Reading production records from SQL databases
//!
//! The core is the [`RecordSource`](trait.RecordSource.html) trait, which represents one
//! production-tracking database of some kind. A source knows how to open a connection,
//! run the fixed read query against the configured relation and convert the returned rows
//! into [`ProductionRecord`](../record/struct.ProductionRecord.html)s.
//!
//! Sources never write. Every call to [`fetch`](trait.RecordSource.html#tymethod.fetch)
//! opens its own connection and closes it before returning, so no state is carried from
//! one refresh to the next.
//!
//! # Failure handling
//!
//! Drivers report every problem as an error. The [`load`](fn.load.html) function is the
//! boundary where those errors stop: it logs them and hands out an empty table together
//! with a [`LoadOutcome`](enum.LoadOutcome.html) describing what happened, so that the
//! dashboard can always render something.
//!
//! # Expected schema
//!
//! The relation (by default `production`) must provide the columns `id, ean, sku,
//! descricao, chassi, montador, data_inicio, data_fim, status`. Identifiers and text
//! columns are read as text regardless of their declared type; `data_inicio` and `data_fim`
//! are read as timestamps without time zone.

use crate::{
    record::{ProductionRecord, ProductionTable},
    settings::{DatabaseKind, DatabaseSettings},
};
use anyhow::{bail, Result};
use derive_more::Display;
use tracing::{error, info, instrument, warn};

mod postgre;
mod sqlite;

pub use postgre::PostgresSource;
pub use sqlite::SqliteSource;

/// Relation read when none is configured
pub const DEFAULT_TABLE_NAME: &str = "production";

/// A production-tracking database that records can be read from
pub trait RecordSource {
    /// driver name for logging
    fn name(&self) -> &'static str;

    /// Read all production records, most recently started first
    ///
    /// Opens one connection for the duration of the call.
    fn fetch(&mut self) -> Result<Vec<ProductionRecord>>;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn fetch(&mut self) -> Result<Vec<ProductionRecord>> {
        (**self).fetch()
    }
}

/// What happened while loading a snapshot
#[derive(Clone, Debug, PartialEq, Display)]
pub enum LoadOutcome {
    #[display(fmt = "loaded {} records", _0)]
    Rows(usize),
    /// the query succeeded but the relation holds no records
    #[display(fmt = "no records found")]
    Empty,
    /// connecting, querying or reading a row failed
    #[display(fmt = "failed to load records: {}", _0)]
    Failed(String),
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

/// Result of one load: the table to show and how it came about
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    pub table: ProductionTable,
    pub outcome: LoadOutcome,
}

/// Load a fresh snapshot from the given source
///
/// Never fails: on any error the failure is logged and an empty table is returned.
#[instrument(skip(source), fields(source = source.name()))]
pub fn load<S: RecordSource + ?Sized>(source: &mut S) -> Loaded {
    match source.fetch() {
        Ok(records) if records.is_empty() => {
            warn!("no production records found");
            Loaded {
                table: ProductionTable::empty(),
                outcome: LoadOutcome::Empty,
            }
        }
        Ok(records) => {
            let n = records.len();
            info!(records = n, "loaded production records");
            Loaded {
                table: ProductionTable::from_records(records),
                outcome: LoadOutcome::Rows(n),
            }
        }
        Err(err) => {
            error!("error loading production records: {:#}", err);
            Loaded {
                table: ProductionTable::empty(),
                outcome: LoadOutcome::Failed(format!("{:#}", err)),
            }
        }
    }
}

/// Create the record source described by the database settings
///
/// No connection is made here, only the parameters are checked.
pub fn open(settings: &DatabaseSettings) -> Result<Box<dyn RecordSource + Send>> {
    let table = settings.table.as_str();
    check_table_name(table)?;
    let source: Box<dyn RecordSource + Send> = match settings.kind {
        DatabaseKind::Postgres => Box::new(PostgresSource::new(settings)?),
        DatabaseKind::Sqlite => match &settings.path {
            Some(path) => Box::new(SqliteSource::new(path.clone(), table)),
            None => bail!("database.path must be set for a sqlite database"),
        },
    };
    Ok(source)
}

/// Ensure the relation name can be put into a query as is
///
/// Accepts plain or schema-qualified identifiers made of ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn check_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').count() <= 2
        && name.split('.').all(|part| {
            part.chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !valid {
        bail!("invalid table name `{}`", name);
    }
    Ok(())
}

/// The read query, identical for all drivers apart from the relation name and the
/// expression used to read a timestamp column
pub(crate) fn select_records(table: &str, timestamp: impl Fn(&str) -> String) -> String {
    format!(
        "select cast(id as text), cast(ean as text), cast(sku as text), \
         cast(descricao as text), cast(chassi as text), cast(montador as text), \
         {}, {}, cast(status as text) \
         from {} order by data_inicio desc",
        timestamp("data_inicio"),
        timestamp("data_fim"),
        table
    )
}
