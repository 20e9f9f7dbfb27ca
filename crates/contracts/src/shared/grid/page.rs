use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::filter::FilterState;

/// Page size. `All` travels as `-1` ("Tutti" in the page-size selector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum PageLength {
    All,
    Rows(u32),
}

impl PageLength {
    pub const OPTIONS: [PageLength; 5] = [
        PageLength::Rows(10),
        PageLength::Rows(25),
        PageLength::Rows(50),
        PageLength::Rows(100),
        PageLength::All,
    ];

    pub fn label(&self) -> String {
        match self {
            PageLength::All => "Tutti".to_string(),
            PageLength::Rows(n) => n.to_string(),
        }
    }
}

impl Default for PageLength {
    fn default() -> Self {
        PageLength::Rows(25)
    }
}

impl From<i64> for PageLength {
    fn from(value: i64) -> Self {
        if value <= 0 {
            PageLength::All
        } else {
            PageLength::Rows(value.min(u32::MAX as i64) as u32)
        }
    }
}

impl From<PageLength> for i64 {
    fn from(value: PageLength) -> Self {
        match value {
            PageLength::All => -1,
            PageLength::Rows(n) => n as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub dir: SortDirection,
}

/// Pagination cursor and ordering of a data request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub length: PageLength,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    pub fn first(length: PageLength) -> Self {
        Self {
            start: 0,
            length,
            sort: None,
        }
    }

    /// Zero-based page index of `start`.
    pub fn page_index(&self) -> u64 {
        match self.length {
            PageLength::All => 0,
            PageLength::Rows(0) => 0,
            PageLength::Rows(n) => self.start / n as u64,
        }
    }

    pub fn go_to(&mut self, page_index: u64) {
        self.start = match self.length {
            PageLength::All => 0,
            PageLength::Rows(n) => page_index * n as u64,
        };
    }
}

/// Body of `POST /api/grid/{grid}/data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataRequest {
    #[serde(default)]
    pub draw: u64,
    #[serde(flatten)]
    pub filters: FilterState,
    #[serde(flatten)]
    pub page: PageRequest,
}

/// String form of a row primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(RowId(s.clone())),
            Value::Number(n) => Some(RowId(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One untyped row: field -> value. Always carries the grid primary key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridRow(pub Map<String, Value>);

impl GridRow {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn id(&self, key_field: &str) -> Option<RowId> {
        self.0.get(key_field).and_then(RowId::from_value)
    }

    /// Text shown in a cell and compared when editing.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(value_text).unwrap_or_default()
    }
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Answer of `POST /api/grid/{grid}/data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    #[serde(default)]
    pub draw: u64,
    pub records_total: u64,
    pub records_filtered: u64,
    #[serde(default)]
    pub data: Vec<GridRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    /// Every row must carry a usable primary key.
    pub fn validate_keys(&self, key_field: &str) -> Result<(), String> {
        match self.data.iter().position(|row| row.id(key_field).is_none()) {
            Some(idx) => Err(format!(
                "riga {} senza chiave primaria '{}'",
                idx + 1,
                key_field
            )),
            None => Ok(()),
        }
    }
}

pub fn page_count(filtered: u64, length: PageLength) -> u64 {
    match length {
        PageLength::All => u64::from(filtered > 0),
        PageLength::Rows(0) => 0,
        PageLength::Rows(n) => filtered.div_ceil(n as u64),
    }
}

/// Position of the current page inside the filtered dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageSummary {
    pub first: u64,
    pub last: u64,
    pub filtered: u64,
    pub total: u64,
    pub page_index: u64,
    pub page_count: u64,
}

impl PageSummary {
    pub fn new(request: &PageRequest, rows_on_page: usize, filtered: u64, total: u64) -> Self {
        let (first, last) = if rows_on_page == 0 {
            (0, 0)
        } else {
            (request.start + 1, request.start + rows_on_page as u64)
        };
        Self {
            first,
            last,
            filtered,
            total,
            page_index: request.page_index(),
            page_count: page_count(filtered, request.length),
        }
    }

    pub fn text(&self) -> String {
        if self.filtered == 0 {
            let mut text = "Vista da 0 a 0 di 0 elementi".to_string();
            if self.total > 0 {
                text.push_str(&format!(
                    " (filtrati da {} elementi totali)",
                    format_count(self.total)
                ));
            }
            return text;
        }
        let mut text = format!(
            "Vista da {} a {} di {} elementi",
            format_count(self.first),
            format_count(self.last),
            format_count(self.filtered)
        );
        if self.filtered < self.total {
            text.push_str(&format!(
                " (filtrati da {} elementi totali)",
                format_count(self.total)
            ));
        }
        text
    }
}

/// 1234567 -> "1.234.567"
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_length_wire_format() {
        assert_eq!(serde_json::to_value(PageLength::All).unwrap(), json!(-1));
        assert_eq!(serde_json::to_value(PageLength::Rows(25)).unwrap(), json!(25));
        let parsed: PageLength = serde_json::from_value(json!(-1)).unwrap();
        assert_eq!(parsed, PageLength::All);
    }

    #[test]
    fn test_data_request_is_flat() {
        let mut request = DataRequest {
            draw: 3,
            filters: FilterState::with_partition("2024-05"),
            page: PageRequest::first(PageLength::Rows(25)),
        };
        request.page.sort = Some(SortSpec {
            field: "Importo".into(),
            dir: SortDirection::Desc,
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["partition"], json!("2024-05"));
        assert_eq!(value["length"], json!(25));
        assert_eq!(value["sort"]["dir"], json!("desc"));

        let back: DataRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_page_result_wire_names() {
        let result: PageResult = serde_json::from_value(json!({
            "draw": 1,
            "recordsTotal": 120,
            "recordsFiltered": 7,
            "data": [{"ID": 5, "RTC": "ROSSI"}]
        }))
        .unwrap();
        assert_eq!(result.records_filtered, 7);
        assert_eq!(result.data[0].id("ID"), Some(RowId("5".into())));
        assert!(result.validate_keys("ID").is_ok());
        assert!(result.validate_keys("id").is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(120, PageLength::Rows(25)), 5);
        assert_eq!(page_count(125, PageLength::Rows(25)), 5);
        assert_eq!(page_count(126, PageLength::Rows(25)), 6);
        assert_eq!(page_count(0, PageLength::Rows(25)), 0);
        assert_eq!(page_count(40, PageLength::All), 1);
    }

    #[test]
    fn test_summary_text() {
        let request = PageRequest::first(PageLength::Rows(25));
        let summary = PageSummary::new(&request, 25, 120, 120);
        assert_eq!(summary.text(), "Vista da 1 a 25 di 120 elementi");
        assert_eq!(summary.page_count, 5);

        let mut request = PageRequest::first(PageLength::Rows(25));
        request.go_to(1);
        let summary = PageSummary::new(&request, 9, 34, 1200);
        assert_eq!(
            summary.text(),
            "Vista da 26 a 34 di 34 elementi (filtrati da 1.200 elementi totali)"
        );
        assert_eq!(summary.page_index, 1);

        let empty = PageSummary::new(&PageRequest::default(), 0, 0, 0);
        assert_eq!(empty.text(), "Vista da 0 a 0 di 0 elementi");
    }

    #[test]
    fn test_row_text() {
        let row: GridRow =
            serde_json::from_value(json!({"id": "a1", "Qta Roma": 2.5, "note": null})).unwrap();
        assert_eq!(row.text("Qta Roma"), "2.5");
        assert_eq!(row.text("note"), "");
        assert_eq!(row.text("missing"), "");
    }
}
