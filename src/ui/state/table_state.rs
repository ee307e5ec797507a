use crate::domain::engine::{QueryEngine, QueryError};
use crate::domain::entities::query::{FilterValue, QueryParams, QueryResult, SortSpec};
use crate::domain::entities::record::{Queryable, RecordId};

/// Raw records plus the current query parameters of one table.
///
/// Nothing derived is stored here: the visible page is recomputed from
/// `records` and `params` on every [`TableState::view`].
#[derive(Debug, Clone)]
pub struct TableState<R> {
    records: Vec<R>,
    params: QueryParams,
}

impl<R: Queryable> TableState<R> {
    pub fn new(records: Vec<R>, page_size: usize) -> Self {
        Self {
            records,
            params: QueryParams::new(page_size),
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn view<'a>(&'a self, engine: &QueryEngine) -> Result<QueryResult<'a, R>, QueryError> {
        engine.query(&self.records, &self.params)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.params.search_term = term.into();
        self.params.page = 1;
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.params.filters.insert(field.into(), value.into());
        self.params.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.params.filters.clear();
        self.params.search_term.clear();
        self.params.page = 1;
    }

    /// Header click: a new column sorts ascending, the same column flips.
    pub fn toggle_sort(&mut self, field: &str) {
        self.params.sort = match self.params.sort.take() {
            Some(current) if current.field == field => Some(SortSpec {
                direction: current.direction.reversed(),
                ..current
            }),
            _ => Some(SortSpec::ascending(field)),
        };
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.params.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.params.page = page;
    }

    /// Returns false when already on the last page.
    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.params.page >= total_pages {
            return false;
        }
        self.params.page += 1;
        true
    }

    /// Returns false when already on the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.params.page <= 1 {
            return false;
        }
        self.params.page -= 1;
        true
    }

    pub fn replace_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.records
    }
}
