use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::domain::entities::record::{Record, RecordId, Value};
use crate::usecase::ports::provider::{ProviderError, RecordProvider};

/// Loads a table from one sheet of an Excel workbook.
pub struct XlsxProvider {
    pub path: PathBuf,
    pub sheet: String,
    pub id_field: String,
    /// Rows above the header row (titles, notes) to skip.
    pub skip_rows: usize,
}

impl XlsxProvider {
    pub fn new(
        path: impl Into<PathBuf>,
        sheet: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            id_field: id_field.into(),
            skip_rows: 0,
        }
    }
}

impl RecordProvider for XlsxProvider {
    fn load(&self) -> Result<Vec<Record>, ProviderError> {
        read_xlsx_sheet(&self.path, &self.sheet, &self.id_field, self.skip_rows)
            .map_err(|err| ProviderError::Message(format!("{err:#}")))
    }
}

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Typed cells keep their type: numeric cells become numbers, the rest text.
/// Empty cells yield `None` so the field is absent from the record.
pub fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Float(v) => Some(Value::Number(*v)),
        Data::Int(v) => Some(Value::Number(*v as f64)),
        Data::Empty => None,
        other => Some(Value::Text(cell_to_string(other))),
    }
}

pub fn read_xlsx_sheet(
    xlsx_path: &Path,
    sheet: &str,
    id_field: &str,
    skip_rows: usize,
) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("failed to read sheet: {sheet}"))?;

    records_from_range(&range, id_field, skip_rows)
        .with_context(|| format!("failed to import sheet: {sheet}"))
}

/// Rows before `skip_rows` (titles, notes) are dropped; the next row is the header.
pub fn records_from_range(
    range: &Range<Data>,
    id_field: &str,
    skip_rows: usize,
) -> Result<Vec<Record>> {
    let rows: Vec<Vec<Data>> = range
        .rows()
        .skip(skip_rows)
        .map(|row| row.to_vec())
        .collect();
    rows_to_records(&rows, id_field)
}

/// First row is the header; every later row with a non-empty id is a record.
pub fn rows_to_records(rows: &[Vec<Data>], id_field: &str) -> Result<Vec<Record>> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        anyhow::bail!("sheet header is required")
    };
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let id_idx = headers
        .iter()
        .position(|name| name == id_field)
        .with_context(|| format!("sheet has no id column: {id_field}"))?;

    let mut records = Vec::new();
    for row in data_rows {
        let id = row.get(id_idx).map(cell_to_string).unwrap_or_default();
        if id.trim().is_empty() {
            continue;
        }

        let mut record = Record::new(RecordId::from(id.trim()));
        for (name, cell) in headers.iter().zip(row) {
            if name.is_empty() {
                continue;
            }
            if let Some(value) = cell_to_value(cell) {
                record.set(name.as_str(), value);
            }
        }
        records.push(record);
    }

    Ok(records)
}
