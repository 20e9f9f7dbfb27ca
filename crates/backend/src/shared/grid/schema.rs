//! Grid schema: which table a grid reads, how its fields map to SQL
//! expressions and which of them may be edited.

use contracts::shared::grid::{ColumnDescriptor, ColumnSet, SortDirection};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use super::error::GridQueryError;

/// One grid field. `expr` is the SQL expression that produces it; for plain
/// columns it is the quoted column name.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub id: String,
    pub title: String,
    pub expr: String,
    pub editable: bool,
    pub visible: bool,
}

impl GridField {
    /// Field backed directly by a table column.
    pub fn column(name: &str) -> Self {
        let descriptor = ColumnDescriptor::new(name);
        Self {
            id: name.to_string(),
            title: descriptor.title,
            expr: quote_ident(name),
            editable: false,
            visible: true,
        }
    }

    /// Field computed from an SQL expression.
    pub fn computed(id: &str, title: &str, expr: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            expr: expr.to_string(),
            editable: false,
            visible: true,
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor::new(self.id.clone())
            .with_title(self.title.clone())
            .editable(self.editable)
            .visible(self.visible)
    }

    /// Field value as text, the form every filter compares against.
    pub fn text_expr(&self) -> String {
        format!("CAST({} AS TEXT)", self.expr)
    }
}

/// Where the partition selector gets its choices from.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSource {
    Fixed(&'static [&'static str]),
    Distinct,
}

#[derive(Debug, Clone)]
pub struct GridSchema {
    pub id: &'static str,
    pub table: &'static str,
    pub key_field: &'static str,
    pub partition_expr: String,
    pub partition_source: PartitionSource,
    pub fields: Vec<GridField>,
    /// Used when the request carries no (known) sort field.
    pub default_order: Vec<(String, SortDirection)>,
    pub editable: bool,
}

impl GridSchema {
    pub fn field(&self, id: &str) -> Option<&GridField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn key(&self) -> Result<&GridField, GridQueryError> {
        self.field(self.key_field)
            .ok_or_else(|| GridQueryError::UnknownColumn(self.key_field.to_string()))
    }

    pub fn is_key(&self, id: &str) -> bool {
        id.eq_ignore_ascii_case(self.key_field)
    }

    pub fn column_set(&self) -> Result<ColumnSet, GridQueryError> {
        let descriptors = self.fields.iter().map(GridField::descriptor).collect();
        ColumnSet::new(descriptors, self.key_field).map_err(GridQueryError::UnknownColumn)
    }

    /// Resolves requested ids to known fields, keeping request order.
    /// Unknown ids are dropped; an empty request selects the visible fields.
    pub fn select_fields(&self, requested: &[String]) -> Vec<&GridField> {
        if requested.is_empty() {
            return self.fields.iter().filter(|f| f.visible).collect();
        }
        requested.iter().filter_map(|id| self.field(id)).collect()
    }
}

/// Double-quotes an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names of `table` in declaration order.
pub async fn table_columns(
    db: &DatabaseConnection,
    table: &str,
) -> Result<Vec<String>, GridQueryError> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    let rows = db
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, sql))
        .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(row.try_get::<String>("", "name")?);
    }
    if columns.is_empty() {
        return Err(GridQueryError::EmptySchema(table.to_string()));
    }
    Ok(columns)
}
