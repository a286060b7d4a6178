//! Customer records and header-driven CSV loading.
//!
//! Input rows carry the columns `Address`, `State`, `City`,
//! `New customer records`, `Latitude` and `Longitude`. Numeric fields are
//! parsed from text: an empty value counts as zero, an empty coordinate is
//! absent. Rows whose value or coordinates are not finite numbers are
//! dropped at load time and never reconsidered. Text fields tolerate
//! non-UTF-8 bytes (e.g. Latin-1 exports).

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};

/// One customer data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub address: String,
    pub state: String,
    pub city: String,
    pub value: f64,
    pub lon: f64,
    pub lat: f64,
}

impl Record {
    /// Build a record with only the fields aggregation cares about.
    pub fn at(lon: f64, lat: f64, value: f64) -> Self {
        Self {
            address: String::new(),
            state: String::new(),
            city: String::new(),
            value,
            lon,
            lat,
        }
    }

    /// A record takes part in aggregation only when all numeric fields are finite.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.value.is_finite()
    }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    address: Option<usize>,
    state: Option<usize>,
    city: Option<usize>,
    value: Option<usize>,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn from_headers(headers: &csv::ByteRecord) -> ClusterResult<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let require =
            |name: &str| find(name).ok_or_else(|| ClusterError::MissingColumn(name.to_string()));

        Ok(Self {
            address: find("Address"),
            state: find("State"),
            city: find("City"),
            value: find("New customer records"),
            lat: require("Latitude")?,
            lon: require("Longitude")?,
        })
    }

    /// Parse one row. Bytes that are not UTF-8 are replaced rather than
    /// failing the row.
    fn record(&self, row: &csv::ByteRecord) -> Option<Record> {
        let text = |index: Option<usize>| -> Option<String> {
            index
                .and_then(|i| row.get(i))
                .map(|field| String::from_utf8_lossy(field).into_owned())
        };

        let value = match parse_number(text(self.value).as_deref()) {
            NumberField::Empty => 0.0,
            NumberField::Value(v) => v,
            NumberField::Invalid => return None,
        };
        let lat = parse_number(text(Some(self.lat)).as_deref()).value()?;
        let lon = parse_number(text(Some(self.lon)).as_deref()).value()?;

        let record = Record {
            address: text(self.address).unwrap_or_default(),
            state: text(self.state).unwrap_or_default(),
            city: text(self.city).unwrap_or_default(),
            value,
            lon,
            lat,
        };
        record.is_valid().then_some(record)
    }
}

enum NumberField {
    Empty,
    Value(f64),
    Invalid,
}

impl NumberField {
    fn value(self) -> Option<f64> {
        match self {
            NumberField::Value(v) => Some(v),
            _ => None,
        }
    }
}

fn parse_number(field: Option<&str>) -> NumberField {
    match field.map(str::trim) {
        None | Some("") => NumberField::Empty,
        Some(text) => text
            .parse::<f64>()
            .map(NumberField::Value)
            .unwrap_or(NumberField::Invalid),
    }
}

/// Counters reported after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Rows read from the source
    pub total: usize,
    /// Rows kept as valid records
    pub kept: usize,
    /// Rows dropped for missing or non-finite numbers
    pub dropped: usize,
}

/// The immutable set of valid records loaded from one source.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    stats: LoadStats,
}

impl RecordSet {
    /// Build a set from already-constructed records, dropping invalid ones.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut stats = LoadStats::default();
        let records: Vec<Record> = records
            .into_iter()
            .inspect(|_| stats.total += 1)
            .filter(Record::is_valid)
            .collect();
        stats.kept = records.len();
        stats.dropped = stats.total - stats.kept;
        Self { records, stats }
    }

    /// Parse CSV from any reader.
    ///
    /// Fails when the `Latitude` or `Longitude` column is missing. A row
    /// the CSV reader cannot decode is dropped like any other bad row.
    pub fn from_reader<R: Read>(reader: R) -> ClusterResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::from_headers(rdr.byte_headers()?)?;

        let mut stats = LoadStats::default();
        let mut records = Vec::new();

        for row in rdr.byte_records() {
            stats.total += 1;
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable row");
                    stats.dropped += 1;
                    continue;
                }
            };
            match columns.record(&row) {
                Some(record) => records.push(record),
                None => stats.dropped += 1,
            }
        }
        stats.kept = records.len();

        debug!(
            total = stats.total,
            kept = stats.kept,
            dropped = stats.dropped,
            "Parsed customer records"
        );

        Ok(Self { records, stats })
    }

    /// Parse CSV text.
    pub fn from_csv_str(text: &str) -> ClusterResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Load a CSV file from disk.
    pub fn from_path(path: &Path) -> ClusterResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of `value` over every record in the set.
    pub fn total_value(&self) -> f64 {
        self.records.iter().map(|r| r.value).sum()
    }
}
