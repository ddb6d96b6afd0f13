//! Availability heatmaps: instance type families against locations.
//!
//! The input is a tab separated export with at least the `InstanceType`,
//! `Location` and `ExistsInLocation` columns. Rows are grouped by instance
//! family, summed per location, normalized so that each family's best
//! location is `1.0`, and drawn as a PNG.

use std::path::PathBuf;

use image::ImageFormat;
use thiserror::Error;

use crate::reporter::Reporter;

pub mod font;
pub mod pivot;
pub mod render;

pub use pivot::{instance_family, load_availability, Availability, PivotTable};
pub use render::{render, Style};

#[derive(Error, Debug)]
pub enum HeatmapError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input has no {0} column")]
    MissingColumn(&'static str),

    #[error("Line {line} has no value for {column}")]
    MissingValue { line: u64, column: &'static str },

    #[error("Line {line}: ExistsInLocation is not a number: {value:?}")]
    InvalidValue { line: u64, value: String },

    #[error("Input has no data rows")]
    Empty,

    #[error("Failed to write {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to render heatmap: {0}")]
    Render(#[from] image::ImageError),
}

/// Parameters of a single `heatmap` run.
#[derive(Clone, Debug)]
pub struct HeatmapOptions {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    /// Where to dump the pivot table before normalization, if anywhere.
    pub pivot_csv: Option<PathBuf>,
    /// Where to dump the normalized table, if anywhere.
    pub normalized_csv: Option<PathBuf>,
}

/// Reads `options.input_file` and writes the heatmap to
/// `options.output_file` as PNG, whatever its extension.
///
/// Returns the normalized table that was drawn.
pub fn generate_heatmap(
    options: &HeatmapOptions,
    reporter: &dyn Reporter,
) -> Result<PivotTable, HeatmapError> {
    let rows = load_availability(&options.input_file)?;
    if rows.is_empty() {
        return Err(HeatmapError::Empty);
    }
    reporter.debug(&format!(
        "Read {} rows from {}",
        rows.len(),
        options.input_file.display()
    ));

    let pivot = PivotTable::from_rows(&rows);
    if let Some(path) = &options.pivot_csv {
        pivot.write_csv_file(path)?;
        reporter.info(&format!("Wrote pivot table to {}", path.display()));
    }

    let normalized = pivot.normalize_rows();
    if let Some(path) = &options.normalized_csv {
        normalized.write_csv_file(path)?;
        reporter.info(&format!("Wrote normalized table to {}", path.display()));
    }

    let image = render(&normalized, &Style::default());
    image.save_with_format(&options.output_file, ImageFormat::Png)?;
    reporter.info(&format!(
        "Wrote {}x{} heatmap ({} families, {} locations) to {}",
        image.width(),
        image.height(),
        normalized.families().len(),
        normalized.locations().len(),
        options.output_file.display()
    ));

    Ok(normalized)
}
