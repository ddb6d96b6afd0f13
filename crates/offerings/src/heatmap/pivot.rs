use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder as CsvReaderBuilder, Writer as CsvWriter};

use super::HeatmapError;

pub const INSTANCE_TYPE: &str = "InstanceType";
pub const LOCATION: &str = "Location";
pub const EXISTS_IN_LOCATION: &str = "ExistsInLocation";

/// Header of the family column in CSV dumps.
pub const INSTANCE_TYPE_FAMILY: &str = "InstanceTypeFamily";

/// One line of an availability export.
#[derive(Clone, Debug, PartialEq)]
pub struct Availability {
    pub instance_type: String,
    pub location: String,
    pub exists_in_location: f64,
}

/// Family of an instance type: everything before the first `.`.
///
/// `m5.large` belongs to `m5`; a type without a `.` is its own family.
pub fn instance_family(instance_type: &str) -> &str {
    instance_type
        .split_once('.')
        .map_or(instance_type, |(family, _)| family)
}

/// Reads a tab separated availability export with a header line.
///
/// Rows with an empty `ExistsInLocation` are skipped. A row too short to
/// reach one of the required columns fails with
/// [`HeatmapError::MissingValue`].
pub fn load_availability(path: &Path) -> Result<Vec<Availability>, HeatmapError> {
    let file = File::open(path).map_err(|source| HeatmapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_availability(file, path)
}

/// Same as [`load_availability`], reading from any byte source. `source`
/// only names the input in errors.
pub fn read_availability<R>(reader: R, source: &Path) -> Result<Vec<Availability>, HeatmapError>
where
    R: Read,
{
    let read_error = |e| HeatmapError::Read {
        path: source.to_path_buf(),
        source: e,
    };

    let mut reader = CsvReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(read_error)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .map(|i| (name, i))
            .ok_or(HeatmapError::MissingColumn(name))
    };
    let instance_type = column(INSTANCE_TYPE)?;
    let location = column(LOCATION)?;
    let exists = column(EXISTS_IN_LOCATION)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |(column, i): (&'static str, usize)| {
            record
                .get(i)
                .ok_or(HeatmapError::MissingValue { line, column })
        };

        let value = field(exists)?;
        if value.trim().is_empty() {
            continue;
        }
        let exists_in_location =
            parse_exists(value).ok_or_else(|| HeatmapError::InvalidValue {
                line,
                value: value.to_string(),
            })?;
        rows.push(Availability {
            instance_type: field(instance_type)?.to_string(),
            location: field(location)?.to_string(),
            exists_in_location,
        });
    }
    Ok(rows)
}

/// Accepts finite numbers and the booleans `true`/`false` (any case).
fn parse_exists(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if value.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        value.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// A family x location matrix. Undefined cells are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct PivotTable {
    families: Vec<String>,
    locations: Vec<String>,
    /// Row-major, `families.len() * locations.len()` cells.
    cells: Vec<Option<f64>>,
}

impl PivotTable {
    /// Sums `ExistsInLocation` per (family, location) pair.
    ///
    /// Families and locations are sorted. Pairs that never occur in `rows`
    /// stay undefined rather than zero.
    pub fn from_rows(rows: &[Availability]) -> Self {
        let mut sums: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        let mut families = BTreeSet::new();
        let mut locations = BTreeSet::new();
        for row in rows {
            let family = instance_family(&row.instance_type);
            families.insert(family);
            locations.insert(row.location.as_str());
            *sums.entry((family, row.location.as_str())).or_default() += row.exists_in_location;
        }

        let mut cells = Vec::with_capacity(families.len() * locations.len());
        for family in &families {
            for location in &locations {
                cells.push(sums.get(&(*family, *location)).copied());
            }
        }

        Self {
            families: families.into_iter().map(String::from).collect(),
            locations: locations.into_iter().map(String::from).collect(),
            cells,
        }
    }

    pub fn families(&self) -> &[String] {
        &self.families
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let width = self.locations.len();
        &self.cells[row * width..(row + 1) * width]
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.row(row)[column]
    }

    /// Cell for a family and location given by name.
    pub fn get(&self, family: &str, location: &str) -> Option<f64> {
        let row = self.families.iter().position(|f| f == family)?;
        let column = self.locations.iter().position(|l| l == location)?;
        self.cell(row, column)
    }

    /// Divides every defined cell by the maximum defined cell of its row.
    ///
    /// A row whose maximum is undefined or not positive becomes entirely
    /// undefined, since there is no scale to relate its cells to.
    pub fn normalize_rows(&self) -> PivotTable {
        let width = self.locations.len();
        let mut cells = Vec::with_capacity(self.cells.len());
        for row in 0..self.families.len() {
            let row = &self.cells[row * width..(row + 1) * width];
            let max = row.iter().flatten().copied().reduce(f64::max);
            match max {
                Some(max) if max > 0.0 => cells.extend(row.iter().map(|c| c.map(|v| v / max))),
                _ => cells.extend(std::iter::repeat(None).take(width)),
            }
        }
        PivotTable {
            families: self.families.clone(),
            locations: self.locations.clone(),
            cells,
        }
    }

    /// Writes the matrix as CSV: a family column, then one column per
    /// location. Undefined cells are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = CsvWriter::from_writer(writer);
        writer.write_record(
            std::iter::once(INSTANCE_TYPE_FAMILY).chain(self.locations.iter().map(String::as_str)),
        )?;
        for (i, family) in self.families.iter().enumerate() {
            let values = self
                .row(i)
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default());
            writer.write_record(std::iter::once(family.clone()).chain(values))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Like [`Self::write_csv`], to a new file at `path`.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), HeatmapError> {
        let file = File::create(path).map_err(|source| HeatmapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(file).map_err(|source| HeatmapError::Export {
            path: path.to_path_buf(),
            source,
        })
    }
}
