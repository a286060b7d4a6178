//! Whole-file CSV table that round-trips every column.
//!
//! Rows keep their original order and any columns the geocoder does not
//! know about. Only blank lines are dropped; a row of empty cells stays.
//! Saving goes through a sibling temp file and a rename so a crash
//! mid-write never leaves a truncated export behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// A CSV file held in memory as text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .byte_headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(lossy)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for (i, record) in rdr.byte_records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
            let mut row: Vec<String> = record.iter().map(lossy).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let table = Self::from_reader(std::io::BufReader::new(file))?;
        debug!(path = %path.display(), rows = table.len(), "Read table");
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named exactly `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending an empty column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }
        self.headers.push(name.to_string());
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width.max(row.len()), String::new());
        }
        width - 1
    }

    /// Cell text, empty when the row is short.
    pub fn get(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Cell text by column name.
    pub fn get_named(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name).map(|column| self.get(row, column))
    }

    pub fn set(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= column {
                r.resize(column + 1, String::new());
            }
            r[column] = value.into();
        }
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Write the whole table to `path` via temp file and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);
        {
            let file = std::fs::File::create(&tmp)
                .with_context(|| format!("Failed to create {}", tmp.display()))?;
            self.to_writer(std::io::BufWriter::new(file))?;
        }
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Cell text; bytes that are not UTF-8 become U+FFFD.
fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
