//! Tools for EC2 instance-type offerings data.
//!
//! The [`import`] and [`db`] modules load tab or comma separated exports into
//! an SQLite database, and [`heatmap`] turns an availability export into a
//! row-normalized heatmap image.

pub mod db;
pub mod heatmap;
pub mod import;
pub mod logging;
pub mod record;
pub mod reporter;

pub use db::{init_schema, insert_batch, DEFAULT_DATABASE_PATH};
pub use import::{import_file, ImportError, ImportOptions, SourceFormat};
pub use record::{Batch, Offering, Table, Zone};
pub use reporter::{LogReporter, MemoryReporter, Reporter};
