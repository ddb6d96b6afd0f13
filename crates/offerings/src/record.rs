//! Typed records for the two tables managed by `dbtool`.

use std::fmt::{self, Display};

use clap::ValueEnum;

/// Target table of an import.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[value(rename_all = "snake_case")]
pub enum Table {
    /// Instance types offered per location.
    InstanceTypeOfferings,
    /// Availability zones.
    Az,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::InstanceTypeOfferings => "instance_type_offerings",
            Table::Az => "az",
        }
    }

    /// Declared columns, in table order. Also the positional field order of
    /// headerless source files.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::InstanceTypeOfferings => Offering::COLUMNS,
            Table::Az => Zone::COLUMNS,
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type stored in one of the managed tables.
pub trait TableRecord: Sized {
    const TABLE: Table;

    /// Column names in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Builds a record from values given in [`Self::COLUMNS`] order.
    ///
    /// Returns `None` when `values` holds fewer than `COLUMNS.len()` entries.
    fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = String>;

    /// Values in [`Self::COLUMNS`] order, ready to bind to an `INSERT`.
    fn values(&self) -> Vec<&str>;

    /// Human readable primary key, used in conflict reports.
    fn key(&self) -> String;
}

/// An instance type offered at a location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offering {
    pub instance_type: String,
    pub location_type: String,
    pub location: String,
}

impl TableRecord for Offering {
    const TABLE: Table = Table::InstanceTypeOfferings;
    const COLUMNS: &'static [&'static str] = &["InstanceType", "LocationType", "Location"];

    fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut values = values.into_iter();
        Some(Self {
            instance_type: values.next()?,
            location_type: values.next()?,
            location: values.next()?,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.instance_type.as_str(),
            self.location_type.as_str(),
            self.location.as_str(),
        ]
    }

    fn key(&self) -> String {
        format!(
            "(Location, InstanceType) = ({}, {})",
            self.location, self.instance_type
        )
    }
}

/// An availability zone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Zone {
    pub zone_id: String,
    pub zone_name: String,
    pub region_name: String,
    pub zone_type: String,
    pub state: String,
}

impl TableRecord for Zone {
    const TABLE: Table = Table::Az;
    const COLUMNS: &'static [&'static str] =
        &["ZoneId", "ZoneName", "RegionName", "ZoneType", "State"];

    fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut values = values.into_iter();
        Some(Self {
            zone_id: values.next()?,
            zone_name: values.next()?,
            region_name: values.next()?,
            zone_type: values.next()?,
            state: values.next()?,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.zone_id.as_str(),
            self.zone_name.as_str(),
            self.region_name.as_str(),
            self.zone_type.as_str(),
            self.state.as_str(),
        ]
    }

    fn key(&self) -> String {
        format!("ZoneId = {}", self.zone_id)
    }
}

/// A validated import batch for a single table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Batch {
    Offerings(Vec<Offering>),
    Zones(Vec<Zone>),
}

impl Batch {
    pub fn table(&self) -> Table {
        match self {
            Batch::Offerings(_) => Table::InstanceTypeOfferings,
            Batch::Zones(_) => Table::Az,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::Offerings(rows) => rows.len(),
            Batch::Zones(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
