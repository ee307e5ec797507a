//! Search, filter, sort and paginate over an in-memory record collection.
//!
//! The engine is stateless: every call reads the records it is given and
//! returns borrowed views into them. Stages always run in the same order
//! (search, filters, sort, page) because each consumes the previous one's
//! output.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::entities::query::{
    EmptyPages, QueryParams, QueryResult, SortDirection, SortSpec,
};
use crate::domain::entities::record::{Queryable, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryEngine {
    searchable_fields: Vec<String>,
    empty_pages: EmptyPages,
}

impl QueryEngine {
    pub fn new<I, S>(searchable_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
            empty_pages: EmptyPages::default(),
        }
    }

    pub fn with_empty_pages(mut self, empty_pages: EmptyPages) -> Self {
        self.empty_pages = empty_pages;
        self
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    pub fn empty_pages(&self) -> EmptyPages {
        self.empty_pages
    }

    pub fn query<'a, R: Queryable>(
        &self,
        records: &'a [R],
        params: &QueryParams,
    ) -> Result<QueryResult<'a, R>, QueryError> {
        if params.page_size == 0 {
            return Err(QueryError::InvalidConfiguration(
                "page_size must be greater than zero".to_string(),
            ));
        }

        let matched = self.matching(records, params);
        let total_matched = matched.len();
        let total_pages = self.total_pages(total_matched, params.page_size);

        // Pages are 1-based; page 0 and pages past the end are simply empty.
        let visible = match params.page.checked_sub(1) {
            Some(page_idx) => matched
                .into_iter()
                .skip(page_idx.saturating_mul(params.page_size))
                .take(params.page_size)
                .collect(),
            None => Vec::new(),
        };

        Ok(QueryResult {
            visible,
            total_matched,
            total_pages,
            total_records: records.len(),
            page: params.page,
            page_size: params.page_size,
        })
    }

    /// Every record passing search and filters, sorted, with no pagination.
    ///
    /// Exports act on this set rather than on the current page.
    pub fn matching<'a, R: Queryable>(&self, records: &'a [R], params: &QueryParams) -> Vec<&'a R> {
        let needle = params.search_term.to_lowercase();
        // "1500.50" is stored as 1500.5; numbers are also matched by the
        // needle's canonical number text.
        let numeric_needle = match Value::parse_number(&needle) {
            number @ Value::Number(_) => Some(number.to_string()),
            Value::Text(_) => None,
        };
        let matched: Vec<&'a R> = records
            .iter()
            .filter(|record| self.matches_search(*record, &needle, numeric_needle.as_deref()))
            .filter(|record| matches_filters(*record, params))
            .collect();

        match &params.sort {
            Some(sort) => sort_records(matched, sort),
            None => matched,
        }
    }

    pub fn total_pages(&self, total_matched: usize, page_size: usize) -> usize {
        if total_matched == 0 {
            return match self.empty_pages {
                EmptyPages::FloorAtOne => 1,
                EmptyPages::Zero => 0,
            };
        }
        total_matched.div_ceil(page_size)
    }

    fn matches_search<R: Queryable>(
        &self,
        record: &R,
        needle: &str,
        numeric_needle: Option<&str>,
    ) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.searchable_fields.iter().any(|name| {
            record.field(name).is_some_and(|value| {
                let text = value.to_string().to_lowercase();
                text.contains(needle)
                    || (matches!(&*value, Value::Number(_))
                        && numeric_needle.is_some_and(|numeric| text.contains(numeric)))
            })
        })
    }
}

fn matches_filters<R: Queryable>(record: &R, params: &QueryParams) -> bool {
    params.active_filters().all(|(name, expected)| {
        record
            .field(name)
            .is_some_and(|actual| actual.filter_eq(expected))
    })
}

fn sort_records<'a, R: Queryable>(records: Vec<&'a R>, sort: &SortSpec) -> Vec<&'a R> {
    let mut keyed: Vec<(Option<Cow<'a, Value>>, &'a R)> = records
        .into_iter()
        .map(|record| (record.field(&sort.field), record))
        .collect();

    // sort_by is stable, so ties keep their input order in both directions.
    keyed.sort_by(|(left, _), (right, _)| {
        let ordering = compare_keys(left.as_deref(), right.as_deref());
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// A missing field is the minimal value.
fn compare_keys(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => left.natural_cmp(right),
    }
}

/// Tallies records per distinct value of `field`, for summary cards.
///
/// Records without the field are not counted.
pub fn count_by<R: Queryable>(records: &[R], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(value) = record.field(field) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
