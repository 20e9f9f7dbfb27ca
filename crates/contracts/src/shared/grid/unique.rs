use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filter::{ColumnFilter, FilterState};

/// Maximum number of distinct values returned for a filter dropdown.
pub const UNIQUE_VALUES_LIMIT: u64 = 200;

/// Body of `POST /api/grid/{grid}/unique_values`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniqueValuesRequest {
    pub column: String,
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub global_search: String,
    #[serde(default)]
    pub column_filters: BTreeMap<String, ColumnFilter>,
}

impl UniqueValuesRequest {
    /// The column's own filter is left out so it does not narrow its choices.
    pub fn for_column(column: &str, filters: &FilterState) -> Self {
        Self {
            column: column.to_string(),
            partition: filters.partition.clone(),
            global_search: filters.global_search.clone(),
            column_filters: filters.column_filters_except(column),
        }
    }

    pub fn filters(&self) -> FilterState {
        FilterState {
            partition: self.partition.clone(),
            global_search: self.global_search.clone(),
            column_filters: self.column_filters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_column_excludes_own_filter() {
        let mut filters = FilterState::with_partition("MAGGIO");
        filters.set_column("RTC", ColumnFilter::exact("ROSSI"));
        filters.set_column("Cliente", ColumnFilter::contains("acme"));

        let request = UniqueValuesRequest::for_column("RTC", &filters);
        assert_eq!(request.partition, "MAGGIO");
        assert!(!request.column_filters.contains_key("RTC"));
        assert!(request.filters().column_filters.contains_key("Cliente"));
    }
}
