use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::engine::QueryEngine;
use crate::domain::entities::notification::Notification;
use crate::domain::entities::record::Record;
use crate::ui::state::table_state::TableState;
use crate::usecase::ports::exporter::{Column, ExportError, ExportFormat, Exporter};
use crate::usecase::ports::notifier::Notifier;

pub struct ExportService {
    engine: QueryEngine,
    notifier: Arc<dyn Notifier>,
}

impl ExportService {
    pub fn new(engine: QueryEngine, notifier: Arc<dyn Notifier>) -> Self {
        Self { engine, notifier }
    }

    /// Writes every record matching the current search and filters, in the
    /// current sort order. The page is ignored. Returns the row count.
    pub fn export(
        &self,
        state: &TableState<Record>,
        exporter: &dyn Exporter,
        columns: &[Column],
        out: &mut dyn Write,
    ) -> Result<usize, ExportError> {
        let rows = self.engine.matching(state.records(), state.params());
        let format = exporter.format();

        match exporter.export(&rows, columns, out) {
            Ok(()) => {
                info!(rows = rows.len(), format = format.extension(), "exported records");
                self.notifier.notify(Notification::success(
                    "Export successful",
                    format!(
                        "{} records exported as {}",
                        rows.len(),
                        format.extension().to_uppercase()
                    ),
                ));
                Ok(rows.len())
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.notifier
                    .notify(Notification::error("Export failed", err.to_string()));
                Err(err)
            }
        }
    }
}

/// `<table>_<YYYYMMDD>.<ext>`
pub fn default_export_file_name(table: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{table}_{}.{}",
        date.format("%Y%m%d"),
        format.extension()
    )
}
