use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partition value that selects every partition on the server.
pub const ALL_PARTITIONS: &str = "TUTTO";

/// Filter on a single column.
///
/// `exact` filters compare for equality (case-insensitive), the others are
/// substring matches where every word of `value` must occur.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub value: String,
    #[serde(default)]
    pub exact: bool,
}

impl ColumnFilter {
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: false,
        }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: true,
        }
    }
}

/// Client-side filter state of a grid: partition selector, global search and
/// per-column filters. Data can only be requested once `partition` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub global_search: String,
    #[serde(default)]
    pub column_filters: BTreeMap<String, ColumnFilter>,
}

impl FilterState {
    pub fn with_partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            ..Default::default()
        }
    }

    pub fn has_partition(&self) -> bool {
        !self.partition.trim().is_empty()
    }

    /// Sets or clears (empty value) a column filter.
    /// Returns `true` when the state changed.
    pub fn set_column(&mut self, field: &str, filter: ColumnFilter) -> bool {
        let value = filter.value.trim();
        if value.is_empty() {
            return self.column_filters.remove(field).is_some();
        }
        let filter = ColumnFilter {
            value: value.to_string(),
            exact: filter.exact,
        };
        if self.column_filters.get(field) == Some(&filter) {
            return false;
        }
        self.column_filters.insert(field.to_string(), filter);
        true
    }

    pub fn column_value(&self, field: &str) -> &str {
        self.column_filters
            .get(field)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set_global_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        if self.global_search == text {
            return false;
        }
        self.global_search = text.to_string();
        true
    }

    pub fn set_partition(&mut self, partition: &str) -> bool {
        let partition = partition.trim();
        if self.partition == partition {
            return false;
        }
        self.partition = partition.to_string();
        true
    }

    /// Column filters without the one on `field`, used for filter-assist
    /// dropdowns so a column does not restrict its own choices.
    pub fn column_filters_except(&self, field: &str) -> BTreeMap<String, ColumnFilter> {
        self.column_filters
            .iter()
            .filter(|(name, _)| name.as_str() != field)
            .map(|(name, filter)| (name.clone(), filter.clone()))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        let mut count = self.column_filters.len();
        if self.has_partition() {
            count += 1;
        }
        if !self.global_search.is_empty() {
            count += 1;
        }
        count
    }
}
