//! Table definitions loaded from a TOML file.
//!
//! ```toml
//! [[tables]]
//! name = "users"
//! source = "users.csv"
//! id_field = "id"
//! searchable_fields = ["name", "email", "phone", "location"]
//! numeric_fields = ["balance"]
//! page_size = 10
//! empty_pages = "floor_at_one"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::engine::QueryEngine;
use crate::domain::entities::query::EmptyPages;
use crate::domain::entities::record::Record;
use crate::infra::import::csv::CsvProvider;
use crate::infra::import::xlsx::XlsxProvider;
use crate::usecase::ports::exporter::Column;
use crate::usecase::ports::provider::RecordProvider;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,

    /// `.csv`, or a workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`) with `sheet` set.
    pub source: PathBuf,

    #[serde(default)]
    pub sheet: Option<String>,

    #[serde(default)]
    pub skip_rows: usize,

    #[serde(default = "default_id_field")]
    pub id_field: String,

    #[serde(default)]
    pub searchable_fields: Vec<String>,

    #[serde(default)]
    pub numeric_fields: Vec<String>,

    pub page_size: usize,

    #[serde(default)]
    pub empty_pages: EmptyPages,

    /// Export columns; when empty every field of the first record is exported.
    #[serde(default)]
    pub columns: Vec<Column>,
}

fn default_id_field() -> String {
    "id".to_string()
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let project_dirs =
        ProjectDirs::from("com", "hellhbbd", "tableq").ok_or(ConfigError::NoConfigDir)?;
    Ok(project_dirs.config_dir().join("config.toml"))
}

impl AppConfig {
    /// Reads and validates `path`. Relative table sources resolve against
    /// the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base_dir)
    }

    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: AppConfig =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        for table in &mut config.tables {
            if table.source.is_relative() {
                table.source = base_dir.join(&table.source);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = BTreeSet::new();
        for table in &self.tables {
            if !names.insert(table.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate table name: {}",
                    table.name
                )));
            }
            table.validate()?;
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|table| table.name == name)
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid(format!(
                "table {}: page_size must be greater than zero",
                self.name
            )));
        }
        if self.id_field.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "table {}: id_field must not be empty",
                self.name
            )));
        }
        if self.is_workbook() && self.sheet.is_none() {
            return Err(ConfigError::Invalid(format!(
                "table {}: sheet is required for workbook sources",
                self.name
            )));
        }
        Ok(())
    }

    pub fn engine(&self) -> QueryEngine {
        QueryEngine::new(self.searchable_fields.iter().cloned()).with_empty_pages(self.empty_pages)
    }

    pub fn provider(&self) -> Result<Arc<dyn RecordProvider>, ConfigError> {
        match (self.is_workbook(), &self.sheet) {
            (true, Some(sheet)) => {
                let mut provider =
                    XlsxProvider::new(self.source.clone(), sheet.clone(), self.id_field.clone());
                provider.skip_rows = self.skip_rows;
                Ok(Arc::new(provider))
            }
            (true, None) => Err(ConfigError::Invalid(format!(
                "table {}: sheet is required for workbook sources",
                self.name
            ))),
            (false, _) if self.extension().as_deref() == Some("csv") => Ok(Arc::new(
                CsvProvider::new(self.source.clone(), self.id_field.clone())
                    .with_numeric_fields(self.numeric_fields.iter().cloned()),
            )),
            (false, _) => Err(ConfigError::Invalid(format!(
                "table {}: unsupported source: {}",
                self.name,
                self.source.display()
            ))),
        }
    }

    pub fn export_columns(&self, records: &[Record]) -> Vec<Column> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        records
            .first()
            .map(|record| {
                record
                    .fields
                    .keys()
                    .map(|field| Column::new(field.clone(), field.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.iter().any(|name| name == field)
    }

    fn extension(&self) -> Option<String> {
        self.source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    fn is_workbook(&self) -> bool {
        matches!(
            self.extension().as_deref(),
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods")
        )
    }
}
