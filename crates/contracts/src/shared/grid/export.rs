use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filter::{ColumnFilter, FilterState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    /// CSV readable by Excel: UTF-8 BOM and `;` separator.
    Excel,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Excel => b';',
        }
    }
}

/// Typed export request built from the current grid state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportQuery {
    pub partition: String,
    pub visible_columns: Vec<String>,
    pub global_search: String,
    pub column_filters: BTreeMap<String, ColumnFilter>,
    pub format: ExportFormat,
}

impl ExportQuery {
    pub fn new(filters: &FilterState, visible_columns: Vec<String>, format: ExportFormat) -> Self {
        Self {
            partition: filters.partition.clone(),
            visible_columns,
            global_search: filters.global_search.clone(),
            column_filters: filters.column_filters.clone(),
            format,
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

/// Flat query-string form of `GET /api/grid/{grid}/export`.
/// Lists and maps travel as JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub visible_columns: String,
    #[serde(default)]
    pub global_search: String,
    #[serde(default)]
    pub column_filters: String,
    #[serde(default)]
    pub format: ExportFormat,
}

impl TryFrom<&ExportQuery> for ExportParams {
    type Error = String;

    fn try_from(query: &ExportQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            partition: query.partition.clone(),
            visible_columns: serde_json::to_string(&query.visible_columns)
                .map_err(|e| e.to_string())?,
            global_search: query.global_search.clone(),
            column_filters: serde_json::to_string(&query.column_filters)
                .map_err(|e| e.to_string())?,
            format: query.format,
        })
    }
}

impl TryFrom<ExportParams> for ExportQuery {
    type Error = String;

    fn try_from(params: ExportParams) -> Result<Self, Self::Error> {
        let visible_columns = if params.visible_columns.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&params.visible_columns)
                .map_err(|e| format!("visible_columns non valido: {}", e))?
        };
        let column_filters = if params.column_filters.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&params.column_filters)
                .map_err(|e| format!("column_filters non valido: {}", e))?
        };
        Ok(Self {
            partition: params.partition,
            visible_columns,
            global_search: params.global_search,
            column_filters,
            format: params.format,
        })
    }
}
