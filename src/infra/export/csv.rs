use std::io::Write;

use anyhow::{Context, Result};

use crate::domain::entities::record::Record;
use crate::usecase::ports::exporter::{Column, ExportError, ExportFormat, Exporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
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
        write_csv(records, columns, out).map_err(|err| ExportError::Message(format!("{err:#}")))
    }
}

fn write_csv(records: &[&Record], columns: &[Column], out: &mut dyn Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(columns.iter().map(|column| column.header.as_str()))
        .context("failed to write csv header")?;

    for record in records {
        let row = columns.iter().map(|column| {
            record
                .get(&column.field)
                .map(ToString::to_string)
                .unwrap_or_default()
        });
        writer
            .write_record(row)
            .with_context(|| format!("failed to write csv row: {}", record.id))?;
    }

    writer.flush().context("failed to flush csv output")?;
    Ok(())
}
