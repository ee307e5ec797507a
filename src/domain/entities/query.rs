use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::entities::record::Value;

/// Dropdown value meaning "no constraint on this field".
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    All,
    Exact(Value),
}

impl FilterValue {
    /// Parses a dropdown selection; the `"all"` sentinel means no constraint.
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_SENTINEL {
            FilterValue::All
        } else {
            FilterValue::Exact(Value::Text(raw.to_string()))
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Exact(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::parse(value)
    }
}

/// How many pages a table reports when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPages {
    /// Report one (empty) page so pagination controls keep their shape.
    #[default]
    FloorAtOne,
    Zero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub search_term: String,
    pub filters: BTreeMap<String, FilterValue>,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
}

impl QueryParams {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn sort_by(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Filters whose value is not the "all" sentinel.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.filters.iter().filter_map(|(field, value)| match value {
            FilterValue::All => None,
            FilterValue::Exact(value) => Some((field.as_str(), value)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a, R> {
    pub visible: Vec<&'a R>,
    pub total_matched: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<R> QueryResult<'_, R> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based positions of the first and last visible record within
    /// the matched set, for "Showing X to Y of Z" labels.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.visible.is_empty() {
            return None;
        }
        let first = (self.page - 1) * self.page_size + 1;
        Some((first, first + self.visible.len() - 1))
    }
}

impl<R> fmt::Display for QueryResult<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_range() {
            Some((first, last)) => write!(
                f,
                "Showing {first} to {last} of {} results",
                self.total_matched
            ),
            None => write!(f, "No records found"),
        }
    }
}
