use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_visible() -> bool {
    true
}

/// Column descriptor as served by `GET /api/grid/{grid}/columns`.
///
/// `visible` and `editable` are server defaults; the client may override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub field: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub editable: bool,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            title: humanize_field(&field),
            field,
            visible: true,
            editable: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// "numero_ordine" -> "Numero Ordine"
pub fn humanize_field(field: &str) -> String {
    field
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validated, ordered column list of one grid.
///
/// Field ids are unique, empty titles are filled in and the primary key
/// column is never editable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn new(descriptors: Vec<ColumnDescriptor>, key_field: &str) -> Result<Self, String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(descriptors.len());

        for mut column in descriptors {
            if column.field.trim().is_empty() {
                return Err("Colonna senza identificativo".to_string());
            }
            if !seen.insert(column.field.clone()) {
                return Err(format!("Colonna duplicata: {}", column.field));
            }
            if column.title.trim().is_empty() {
                column.title = humanize_field(&column.field);
            }
            if column.field.eq_ignore_ascii_case(key_field) {
                column.editable = false;
            }
            columns.push(column);
        }

        Ok(Self { columns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.get(field).map(|c| c.editable).unwrap_or(false)
    }

    /// Returns `true` when the visibility actually changed.
    pub fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(column) if column.visible != visible => {
                column.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn visible_fields(&self) -> Vec<String> {
        self.visible().map(|c| c.field.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_field() {
        assert_eq!(humanize_field("numero_ordine"), "Numero Ordine");
        assert_eq!(humanize_field("RTC"), "RTC");
        assert_eq!(humanize_field("descrizione"), "Descrizione");
    }

    #[test]
    fn test_descriptor_defaults_from_json() {
        let column: ColumnDescriptor = serde_json::from_str(r#"{"field":"Stato"}"#).unwrap();
        assert!(column.visible);
        assert!(!column.editable);
        assert_eq!(column.title, "");
    }

    #[test]
    fn test_column_set_rejects_duplicates() {
        let result = ColumnSet::new(
            vec![ColumnDescriptor::new("ID"), ColumnDescriptor::new("ID")],
            "ID",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_column_set_key_never_editable() {
        let set = ColumnSet::new(
            vec![
                ColumnDescriptor::new("ID").editable(true),
                ColumnDescriptor::new("Note").editable(true),
                ColumnDescriptor {
                    field: "Stato".into(),
                    title: String::new(),
                    visible: false,
                    editable: true,
                },
            ],
            "ID",
        )
        .unwrap();

        assert!(!set.is_editable("ID"));
        assert!(set.is_editable("Note"));
        assert_eq!(set.get("Stato").unwrap().title, "Stato");
        assert_eq!(set.visible_fields(), vec!["ID", "Note"]);
    }

    #[test]
    fn test_set_visible_reports_change() {
        let mut set = ColumnSet::new(vec![ColumnDescriptor::new("RTC")], "ID").unwrap();
        assert!(set.set_visible("RTC", false));
        assert!(!set.set_visible("RTC", false));
        assert!(!set.set_visible("missing", true));
    }
}
