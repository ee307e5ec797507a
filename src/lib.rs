//! Search, filter, sort and paginate tables of in-memory records.
//!
//! - `domain`: record and query types, and the stateless [`QueryEngine`]
//! - `ui::state`: per-table raw records plus current query parameters
//! - `usecase`: ports (provider, exporter, notifier) and the services built on them
//! - `infra`: CSV/XLSX/in-memory providers, CSV/JSON exporters, notifiers
//! - `config`: TOML table definitions

pub mod config;
pub mod domain;
pub mod infra;
pub mod ui;
pub mod usecase;

pub use domain::engine::{count_by, QueryEngine, QueryError};
pub use domain::entities::query::{
    EmptyPages, FilterValue, QueryParams, QueryResult, SortDirection, SortSpec,
};
pub use domain::entities::record::{Queryable, Record, RecordId, Value};
pub use ui::state::table_state::TableState;

#[cfg(test)]
mod tests;
