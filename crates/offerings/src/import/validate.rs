use std::collections::BTreeSet;

use super::{loader::RawRecord, ImportError};
use crate::record::{Batch, Offering, Table, TableRecord, Zone};

/// Checks that every record carries the columns declared for `table`.
///
/// Records may hold further named columns, which are dropped later, but all
/// records must share one set of names. Field order does not matter and
/// unnamed surplus values count as a mismatch. Fails on the first offending
/// record, in source order.
pub fn validate_shapes(records: &[RawRecord], table: Table) -> Result<(), ImportError> {
    let declared: BTreeSet<&str> = table.columns().iter().copied().collect();
    let mut uniform: Option<BTreeSet<&str>> = None;

    for record in records {
        let found: BTreeSet<&str> = record.names().collect();
        let expected = match &uniform {
            Some(names) => names.clone(),
            None => declared.clone(),
        };
        let fits = found.is_superset(&declared) && (uniform.is_none() || found == expected);
        if !fits || !record.rest.is_empty() {
            let mut found: Vec<String> = found.into_iter().map(String::from).collect();
            if !record.rest.is_empty() {
                found.push(format!("<{} unnamed>", record.rest.len()));
            }
            return Err(ImportError::ShapeMismatch {
                table,
                line: record.line,
                expected: expected.into_iter().map(String::from).collect(),
                found,
            });
        }
        if uniform.is_none() {
            uniform = Some(found);
        }
    }
    Ok(())
}

/// Converts shape-checked records into the typed batch for `table`.
pub fn into_batch(records: Vec<RawRecord>, table: Table) -> Result<Batch, ImportError> {
    Ok(match table {
        Table::InstanceTypeOfferings => Batch::Offerings(typed::<Offering>(records)?),
        Table::Az => Batch::Zones(typed::<Zone>(records)?),
    })
}

fn typed<T: TableRecord>(records: Vec<RawRecord>) -> Result<Vec<T>, ImportError> {
    records
        .into_iter()
        .map(|mut record| {
            let mut values = Vec::with_capacity(T::COLUMNS.len());
            for &column in T::COLUMNS {
                match record.fields.swap_remove(column) {
                    Some(value) if !value.is_empty() => values.push(value),
                    _ => {
                        return Err(ImportError::EmptyField {
                            line: record.line,
                            column,
                        })
                    }
                }
            }
            T::from_values(values).ok_or(ImportError::EmptyField {
                line: record.line,
                column: T::COLUMNS[0],
            })
        })
        .collect()
}
