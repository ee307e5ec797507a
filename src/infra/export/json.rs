use std::io::Write;

use serde_json::{Map, Value as JsonValue};

use crate::domain::entities::record::Record;
use crate::usecase::ports::exporter::{Column, ExportError, ExportFormat, Exporter};

/// Writes a JSON array with one object per record, keyed by column header.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(
        &self,
        records: &[&Record],
        columns: &[Column],
        out: &mut dyn Write,
    ) -> Result<(), ExportError> {
        if columns.is_empty() {
            return Err(ExportError::NoColumns);
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut row = Map::new();
                for column in columns {
                    let value = match record.get(&column.field) {
                        Some(value) => serde_json::to_value(value)
                            .map_err(|err| ExportError::Message(err.to_string()))?,
                        None => JsonValue::Null,
                    };
                    row.insert(column.header.clone(), value);
                }
                Ok::<_, ExportError>(JsonValue::Object(row))
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        serde_json::to_writer_pretty(&mut *out, &rows)
            .map_err(|err| ExportError::Message(err.to_string()))?;
        out.flush()
            .map_err(|err| ExportError::Message(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_stay_numbers_and_missing_fields_are_null() {
        let records = [
            Record::new("T1").with("amount", 2500).with("status", "Paid"),
            Record::new("T2").with("status", "Failed"),
        ];
        let rows: Vec<&Record> = records.iter().collect();
        let columns = [Column::new("amount", "Amount"), Column::new("status", "Status")];
        let mut out = Vec::new();

        JsonExporter
            .export(&rows, &columns, &mut out)
            .expect("export should succeed");

        let parsed: JsonValue = serde_json::from_slice(&out).expect("output should be json");
        assert_eq!(
            parsed,
            serde_json::json!([
                {"Amount": 2500.0, "Status": "Paid"},
                {"Amount": null, "Status": "Failed"}
            ])
        );
    }
}
