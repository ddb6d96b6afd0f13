//! Importing tab or comma separated exports into the offerings database.
//!
//! An import runs in three steps, each of which can reject the whole file:
//!
//! 1. [`loader`] reads the source into [`RawRecord`]s;
//! 2. [`validate`] checks every record against the columns of the target
//!    [`Table`] and builds a typed [`Batch`](crate::Batch);
//! 3. [`crate::db::insert_batch`] writes the batch in a single transaction.
//!
//! Nothing touches the database until the first two steps succeed.

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use clap::ValueEnum;
use thiserror::Error;

use crate::{db, record::Table, reporter::Reporter};

pub mod loader;
pub mod validate;

pub use loader::{load_records, read_records, RawRecord};
pub use validate::{into_batch, validate_shapes};

/// Hint logged along with shape errors.
pub const SHAPE_HINT: &str =
    "invalid row shapes. consider using the -k option or check the source file";

/// Delimiter of a source file.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceFormat {
    /// Tab separated values.
    #[default]
    Tsv,
    /// Comma separated values.
    Csv,
}

impl SourceFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            SourceFormat::Tsv => b'\t',
            SourceFormat::Csv => b',',
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Tsv => f.write_str("tsv"),
            SourceFormat::Csv => f.write_str("csv"),
        }
    }
}

/// An error that aborts an import. No row of the batch is written.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source file does not exist.
    #[error("File not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source file is not valid delimited text.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A headerless line has fewer fields than the target table has columns.
    #[error("Line {line} has {found} fields, expected at least {expected}")]
    ShortRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A record's field names differ from the columns of the target table.
    #[error(
        "Line {line} does not match the columns of {table}: expected {expected:?}, found {found:?}"
    )]
    ShapeMismatch {
        table: Table,
        line: u64,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A required value is missing or empty.
    #[error("Line {line} has an empty value for {column}")]
    EmptyField { line: u64, column: &'static str },

    /// A record collides with a primary key already in the table or earlier
    /// in the same batch.
    #[error("Duplicate primary key in {table}: {key}")]
    Conflict { table: Table, key: String },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// I/O error on a source or database path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    /// Errors caused by the source file rather than by storage.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            ImportError::ShortRow { .. }
                | ImportError::ShapeMismatch { .. }
                | ImportError::EmptyField { .. }
        )
    }
}

/// Parameters of a single `dbtool import` run.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    pub database: PathBuf,
    pub table: Table,
    pub source_file: PathBuf,
    pub with_no_header: bool,
    pub format: SourceFormat,
}

/// Loads, validates and inserts `options.source_file` into `options.table`.
///
/// Returns the number of inserted rows. Failures are reported through
/// `reporter` before they are returned.
pub fn import_file(
    options: &ImportOptions,
    reporter: &dyn Reporter,
) -> Result<usize, ImportError> {
    let result = run_import(options, reporter);
    if let Err(e) = &result {
        if e.is_shape_error() {
            reporter.error(SHAPE_HINT);
        }
        reporter.error(&e.to_string());
    }
    result
}

fn run_import(options: &ImportOptions, reporter: &dyn Reporter) -> Result<usize, ImportError> {
    reporter.debug(&format!(
        "Importing {} ({}, header: {}) into {}",
        options.source_file.display(),
        options.format,
        !options.with_no_header,
        options.table
    ));

    let records = load_records(
        &options.source_file,
        options.format,
        options.with_no_header,
        options.table,
    )?;
    validate_shapes(&records, options.table)?;
    let batch = into_batch(records, options.table)?;
    if batch.is_empty() {
        reporter.warn(&format!("No data rows in {}", options.source_file.display()));
    }

    let mut conn = db::open_existing(&options.database)?;
    let inserted = db::insert_batch(&mut conn, &batch)?;
    db::close(conn)?;

    reporter.info(&format!("Inserted {inserted} rows into {}", options.table));
    Ok(inserted)
}
