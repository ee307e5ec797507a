use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::engine::{count_by, QueryEngine, QueryError};
use crate::domain::entities::query::QueryResult;
use crate::domain::entities::record::Queryable;
use crate::ui::state::table_state::TableState;

pub struct QueryService {
    engine: QueryEngine,
}

impl QueryService {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn view<'a, R: Queryable>(
        &self,
        state: &'a TableState<R>,
    ) -> Result<QueryResult<'a, R>, QueryError> {
        let result = state.view(&self.engine)?;
        debug!(
            page = result.page,
            total_pages = result.total_pages,
            matched = result.total_matched,
            total = result.total_records,
            "computed table view"
        );
        Ok(result)
    }

    /// Per-value counts over the whole collection, ignoring search and filters.
    pub fn summary<R: Queryable>(&self, state: &TableState<R>, field: &str) -> BTreeMap<String, usize> {
        count_by(state.records(), field)
    }
}
