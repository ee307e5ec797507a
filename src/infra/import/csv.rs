use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::StringRecord;

use crate::domain::entities::record::{Record, RecordId, Value};
use crate::usecase::ports::provider::{ProviderError, RecordProvider};

/// Loads a table from a CSV file with a header row.
///
/// Columns listed in `numeric_fields` are parsed as numbers; everything
/// else, ids included, stays text. Blank cells leave the field off the record.
pub struct CsvProvider {
    pub path: PathBuf,
    pub id_field: String,
    pub numeric_fields: BTreeSet<String>,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>, id_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id_field: id_field.into(),
            numeric_fields: BTreeSet::new(),
        }
    }

    pub fn with_numeric_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl RecordProvider for CsvProvider {
    fn load(&self) -> Result<Vec<Record>, ProviderError> {
        read_csv_file(&self.path, &self.id_field, &self.numeric_fields)
            .map_err(|err| ProviderError::Message(format!("{err:#}")))
    }
}

pub fn read_csv_file(
    csv_path: &Path,
    id_field: &str,
    numeric_fields: &BTreeSet<String>,
) -> Result<Vec<Record>> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    read_csv_records(reader, id_field, numeric_fields)
        .with_context(|| format!("failed to import csv: {}", csv_path.display()))
}

pub fn read_csv_records<R: Read>(
    mut reader: csv::Reader<R>,
    id_field: &str,
    numeric_fields: &BTreeSet<String>,
) -> Result<Vec<Record>> {
    let headers = reader
        .headers()
        .context("failed to read headers from csv")?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let id_idx = headers
        .iter()
        .position(|name| name == id_field)
        .with_context(|| format!("csv has no id column: {id_field}"))?;

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.context("failed to parse csv record")?;
        let id = row.get(id_idx).unwrap_or("").trim();
        if id.is_empty() {
            // +2: header line and 1-based numbering
            anyhow::bail!("csv line {} has an empty {id_field}", row_idx + 2)
        }
        records.push(row_to_record(RecordId::from(id), &headers, &row, numeric_fields));
    }

    Ok(records)
}

fn row_to_record(
    id: RecordId,
    headers: &StringRecord,
    row: &StringRecord,
    numeric_fields: &BTreeSet<String>,
) -> Record {
    let mut record = Record::new(id);
    for (col_idx, name) in headers.iter().enumerate() {
        let raw = row.get(col_idx).unwrap_or("");
        // Blank cells are absent fields, the same as empty workbook cells.
        if raw.trim().is_empty() {
            continue;
        }
        let value = if numeric_fields.contains(name) {
            Value::parse_number(raw)
        } else {
            Value::Text(raw.to_string())
        };
        record.set(name, value);
    }
    record
}
