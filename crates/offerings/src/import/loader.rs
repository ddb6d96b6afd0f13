use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder as CsvReaderBuilder, StringRecord};
use indexmap::IndexMap;

use super::{ImportError, SourceFormat};
use crate::record::Table;

/// One data line of a source file, before it is checked against a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source file.
    pub line: u64,

    /// Field name to value, in source order.
    pub fields: IndexMap<String, String>,

    /// Values past the last header column. Always empty for headerless input.
    pub rest: Vec<String>,
}

impl RawRecord {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reads every data line of `path`.
///
/// With `with_no_header`, fields bind positionally to `table`'s column
/// order; otherwise the first line names the fields.
pub fn load_records(
    path: &Path,
    format: SourceFormat,
    with_no_header: bool,
    table: Table,
) -> Result<Vec<RawRecord>, ImportError> {
    if !path.exists() {
        return Err(ImportError::SourceNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file, path, format, with_no_header, table)
}

/// Same as [`load_records`], reading from any byte source. `source` only
/// names the input in errors.
pub fn read_records<R>(
    reader: R,
    source: &Path,
    format: SourceFormat,
    with_no_header: bool,
    table: Table,
) -> Result<Vec<RawRecord>, ImportError>
where
    R: Read,
{
    let mut reader = CsvReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(!with_no_header)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = if with_no_header {
        table.columns().iter().map(|c| c.to_string()).collect()
    } else {
        reader
            .headers()
            .map_err(|e| read_error(source, e))?
            .iter()
            .map(String::from)
            .collect()
    };

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => return Err(read_error(source, e)),
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if with_no_header && record.len() < header.len() {
            return Err(ImportError::ShortRow {
                line,
                expected: header.len(),
                found: record.len(),
            });
        }

        let mut values = record.iter();
        let fields = header
            .iter()
            .zip(values.by_ref())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        // Headerless lines keep only the declared columns.
        let rest = if with_no_header {
            Vec::new()
        } else {
            values.map(String::from).collect()
        };
        records.push(RawRecord { line, fields, rest });
    }

    Ok(records)
}

fn read_error(path: &Path, source: csv::Error) -> ImportError {
    ImportError::Read {
        path: path.to_path_buf(),
        source,
    }
}
