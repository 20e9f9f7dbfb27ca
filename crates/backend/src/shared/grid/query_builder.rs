use contracts::shared::grid::{
    DataRequest, ExportQuery, FilterState, PageLength, PageRequest, SortSpec, ALL_PARTITIONS,
    UNIQUE_VALUES_LIMIT,
};
use sea_orm::Value;

use super::error::GridQueryError;
use super::schema::{quote_ident, GridField, GridSchema};

/// SQL text with its positional parameters.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds the parameterised statements of one grid.
///
/// Field ids coming from clients are only used to look up schema fields;
/// everything that reaches the SQL text is a schema expression.
pub struct GridQueryBuilder<'a> {
    schema: &'a GridSchema,
}

impl<'a> GridQueryBuilder<'a> {
    pub fn new(schema: &'a GridSchema) -> Self {
        Self { schema }
    }

    fn table(&self) -> String {
        quote_ident(self.schema.table)
    }

    /// `WHERE` body (without the keyword) for a filter state.
    pub fn where_clause(&self, filters: &FilterState) -> QueryResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        let partition = filters.partition.trim();
        if !partition.is_empty() && !partition.eq_ignore_ascii_case(ALL_PARTITIONS) {
            conditions.push(format!(
                "UPPER(TRIM(CAST({} AS TEXT))) = UPPER(TRIM(?))",
                self.schema.partition_expr
            ));
            params.push(partition.to_string().into());
        }

        let search = filters.global_search.trim();
        if !search.is_empty() {
            let like = format!("%{}%", escape_like(&search.to_lowercase()));
            let ors: Vec<String> = self
                .schema
                .fields
                .iter()
                .map(|f| format!("lower({}) LIKE ? ESCAPE '\\'", f.text_expr()))
                .collect();
            for _ in &ors {
                params.push(like.clone().into());
            }
            conditions.push(format!("({})", ors.join(" OR ")));
        }

        for (field_id, filter) in &filters.column_filters {
            let Some(field) = self.schema.field(field_id) else {
                tracing::warn!("Ignoring filter on unknown column {}", field_id);
                continue;
            };
            let value = filter.value.trim();
            if value.is_empty() {
                continue;
            }
            if filter.exact {
                conditions.push(format!(
                    "UPPER(TRIM({})) = UPPER(TRIM(?))",
                    field.text_expr()
                ));
                params.push(value.to_string().into());
            } else {
                for word in value.split_whitespace() {
                    conditions.push(format!("lower({}) LIKE ? ESCAPE '\\'", field.text_expr()));
                    params.push(format!("%{}%", escape_like(&word.to_lowercase())).into());
                }
            }
        }

        QueryResult {
            sql: conditions.join(" AND "),
            params,
        }
    }

    /// `ORDER BY` body. The key is always appended so paging is stable.
    pub fn order_clause(&self, sort: Option<&SortSpec>) -> String {
        let mut parts = Vec::new();
        match sort.and_then(|s| self.schema.field(&s.field).map(|f| (f, s.dir))) {
            Some((field, dir)) => parts.push(format!("{} {}", field.expr, dir.as_sql())),
            None => {
                for (field_id, dir) in &self.schema.default_order {
                    if let Some(field) = self.schema.field(field_id) {
                        parts.push(format!("{} {}", field.expr, dir.as_sql()));
                    }
                }
            }
        }
        if let Some(key) = self.schema.field(self.schema.key_field) {
            parts.push(format!("{} ASC", key.expr));
        }
        parts.join(", ")
    }

    fn select_list(fields: &[&GridField]) -> String {
        fields
            .iter()
            .map(|f| format!("{} AS {}", f.expr, quote_ident(&f.id)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn with_where(&self, mut sql: String, filters: &FilterState) -> QueryResult {
        let where_part = self.where_clause(filters);
        if !where_part.sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_part.sql);
        }
        QueryResult {
            sql,
            params: where_part.params,
        }
    }

    /// Row count, filtered when `filters` is given.
    pub fn count_query(&self, filters: Option<&FilterState>) -> QueryResult {
        let sql = format!("SELECT COUNT(*) AS cnt FROM {}", self.table());
        match filters {
            Some(filters) => self.with_where(sql, filters),
            None => QueryResult {
                sql,
                params: Vec::new(),
            },
        }
    }

    /// One page of rows with every schema field.
    pub fn data_query(&self, request: &DataRequest) -> QueryResult {
        let fields: Vec<&GridField> = self.schema.fields.iter().collect();
        let sql = format!(
            "SELECT {} FROM {}",
            Self::select_list(&fields),
            self.table()
        );
        let mut query = self.with_where(sql, &request.filters);
        query.sql.push_str(" ORDER BY ");
        query
            .sql
            .push_str(&self.order_clause(request.page.sort.as_ref()));
        query.sql.push_str(&limit_clause(&request.page));
        query
    }

    /// Distinct, upper-cased, non-empty values of `column`.
    /// The column's own filter is ignored.
    pub fn unique_values_query(
        &self,
        column: &str,
        filters: &FilterState,
    ) -> Result<QueryResult, GridQueryError> {
        let field = self
            .schema
            .field(column)
            .ok_or_else(|| GridQueryError::UnknownColumn(column.to_string()))?;

        let own_filter_removed = FilterState {
            column_filters: filters.column_filters_except(column),
            ..filters.clone()
        };

        let where_part = self.where_clause(&own_filter_removed);
        let mut conditions = vec![format!(
            "{} IS NOT NULL AND TRIM({}) <> ''",
            field.expr,
            field.text_expr()
        )];
        if !where_part.sql.is_empty() {
            conditions.push(where_part.sql);
        }

        let query = QueryResult {
            sql: format!(
                "SELECT DISTINCT UPPER(TRIM({})) AS value FROM {} WHERE {} ORDER BY value LIMIT {}",
                field.text_expr(),
                self.table(),
                conditions.join(" AND "),
                UNIQUE_VALUES_LIMIT
            ),
            params: where_part.params,
        };
        Ok(query)
    }

    /// All filtered rows restricted to the export columns, in default order.
    pub fn export_query(&self, export: &ExportQuery) -> (QueryResult, Vec<&'a GridField>) {
        let fields = self.schema.select_fields(&export.visible_columns);
        let sql = format!(
            "SELECT {} FROM {}",
            Self::select_list(&fields),
            self.table()
        );
        let mut query = self.with_where(sql, &export.filters());
        query.sql.push_str(" ORDER BY ");
        query.sql.push_str(&self.order_clause(None));
        (query, fields)
    }

    /// Distinct partition values, newest first.
    pub fn partitions_query(&self) -> QueryResult {
        QueryResult {
            sql: format!(
                "SELECT DISTINCT CAST({expr} AS TEXT) AS value FROM {table}
                 WHERE {expr} IS NOT NULL AND TRIM(CAST({expr} AS TEXT)) <> ''
                 ORDER BY value DESC",
                expr = self.schema.partition_expr,
                table = self.table()
            ),
            params: Vec::new(),
        }
    }

    fn editable_field(&self, field: &str) -> Result<&GridField, GridQueryError> {
        if !self.schema.editable {
            return Err(GridQueryError::ReadOnlyGrid(self.schema.id.to_string()));
        }
        let grid_field = self
            .schema
            .field(field)
            .ok_or_else(|| GridQueryError::UnknownColumn(field.to_string()))?;
        if self.schema.is_key(field) || !grid_field.editable {
            return Err(GridQueryError::ReadOnlyField(field.to_string()));
        }
        Ok(grid_field)
    }

    /// Current value of one cell, for the edit log.
    pub fn cell_value_query(&self, pk: &str, field: &str) -> Result<QueryResult, GridQueryError> {
        let grid_field = self.editable_field(field)?;
        let key = self.schema.key()?;
        Ok(QueryResult {
            sql: format!(
                "SELECT {} AS value FROM {} WHERE {} = ?",
                grid_field.text_expr(),
                self.table(),
                key.expr
            ),
            params: vec![pk.to_string().into()],
        })
    }

    pub fn update_statement(
        &self,
        pk: &str,
        field: &str,
        value: Value,
    ) -> Result<QueryResult, GridQueryError> {
        let grid_field = self.editable_field(field)?;
        let key = self.schema.key()?;
        Ok(QueryResult {
            sql: format!(
                "UPDATE {} SET {} = ? WHERE {} = ?",
                self.table(),
                quote_ident(&grid_field.id),
                key.expr
            ),
            params: vec![value, pk.to_string().into()],
        })
    }
}

/// `LIMIT ... OFFSET ...` suffix; empty for "all rows".
pub fn limit_clause(page: &PageRequest) -> String {
    match page.length {
        PageLength::All => String::new(),
        PageLength::Rows(n) => format!(" LIMIT {} OFFSET {}", n, page.start),
    }
}

/// Escape LIKE wildcards for SQLite; used with `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::grid::schema::PartitionSource;
    use contracts::shared::grid::{ColumnFilter, SortDirection};

    fn schema() -> GridSchema {
        GridSchema {
            id: "service_orders",
            table: "orders",
            key_field: "ID",
            partition_expr: quote_ident("Mese"),
            partition_source: PartitionSource::Distinct,
            fields: vec![
                GridField::column("ID"),
                GridField::column("Mese"),
                GridField::column("RTC").editable(true),
                GridField::column("Descrizione").editable(true),
                GridField::computed("Totale", "Totale", "ROUND(\"Importo\", 2)"),
            ],
            default_order: vec![("Totale".to_string(), SortDirection::Desc)],
            editable: true,
        }
    }

    #[test]
    fn test_all_partitions_adds_no_condition() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let query = builder.where_clause(&FilterState::with_partition("tutto"));
        assert!(query.sql.is_empty());
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_where_clause_combines_filters() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let mut filters = FilterState::with_partition("maggio");
        filters.set_global_search("acme");
        filters.set_column("RTC", ColumnFilter::exact("rossi"));
        filters.set_column("Descrizione", ColumnFilter::contains("pompa calore"));
        filters.set_column("bogus", ColumnFilter::contains("x"));

        let query = builder.where_clause(&filters);
        assert!(query
            .sql
            .starts_with("UPPER(TRIM(CAST(\"Mese\" AS TEXT))) = UPPER(TRIM(?))"));
        assert!(query.sql.contains("UPPER(TRIM(CAST(\"RTC\" AS TEXT))) = UPPER(TRIM(?))"));
        assert_eq!(
            query
                .sql
                .matches("lower(CAST(\"Descrizione\" AS TEXT)) LIKE ?")
                .count(),
            // one from the global search, one per filter word
            3
        );
        assert!(!query.sql.contains("bogus"));
        // partition + 5 search ORs + exact + 2 words
        assert_eq!(query.params.len(), 1 + 5 + 1 + 2);
    }

    #[test]
    fn test_like_escaping() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_order_clause_falls_back_to_default() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        assert_eq!(
            builder.order_clause(None),
            "ROUND(\"Importo\", 2) DESC, \"ID\" ASC"
        );
        let unknown = SortSpec {
            field: "nope; DROP TABLE".into(),
            dir: SortDirection::Asc,
        };
        assert_eq!(
            builder.order_clause(Some(&unknown)),
            "ROUND(\"Importo\", 2) DESC, \"ID\" ASC"
        );
        let by_rtc = SortSpec {
            field: "RTC".into(),
            dir: SortDirection::Desc,
        };
        assert_eq!(builder.order_clause(Some(&by_rtc)), "\"RTC\" DESC, \"ID\" ASC");
    }

    #[test]
    fn test_data_query_paging() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let mut request = DataRequest {
            draw: 1,
            filters: FilterState::with_partition("MAGGIO"),
            page: PageRequest::first(PageLength::Rows(25)),
        };
        request.page.go_to(2);
        let query = builder.data_query(&request);
        assert!(query.sql.contains("ROUND(\"Importo\", 2) AS \"Totale\""));
        assert!(query.sql.ends_with(" LIMIT 25 OFFSET 50"));

        request.page.length = PageLength::All;
        let query = builder.data_query(&request);
        assert!(!query.sql.contains("LIMIT"));
    }

    #[test]
    fn test_unique_values_query() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let mut filters = FilterState::with_partition(ALL_PARTITIONS);
        filters.set_column("RTC", ColumnFilter::exact("ROSSI"));

        let query = builder.unique_values_query("RTC", &filters).unwrap();
        assert!(query.sql.starts_with("SELECT DISTINCT UPPER(TRIM(CAST(\"RTC\" AS TEXT)))"));
        assert!(query.sql.contains(" WHERE \"RTC\" IS NOT NULL"));
        assert!(query.sql.ends_with("ORDER BY value LIMIT 200"));
        assert!(query.params.is_empty());

        assert!(builder.unique_values_query("bogus", &filters).is_err());
    }

    #[test]
    fn test_update_statement_rules() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let query = builder
            .update_statement("7", "RTC", "BIANCHI".into())
            .unwrap();
        assert_eq!(query.sql, "UPDATE \"orders\" SET \"RTC\" = ? WHERE \"ID\" = ?");

        assert!(matches!(
            builder.update_statement("7", "ID", "8".into()),
            Err(GridQueryError::ReadOnlyField(_))
        ));
        assert!(matches!(
            builder.update_statement("7", "Totale", "1".into()),
            Err(GridQueryError::ReadOnlyField(_))
        ));
        assert!(matches!(
            builder.update_statement("7", "bogus", "1".into()),
            Err(GridQueryError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_export_query_uses_requested_columns() {
        let schema = schema();
        let builder = GridQueryBuilder::new(&schema);
        let export = ExportQuery {
            partition: "MAGGIO".into(),
            visible_columns: vec!["RTC".into(), "ID".into(), "bogus".into()],
            ..Default::default()
        };
        let (query, fields) = builder.export_query(&export);
        assert_eq!(fields.len(), 2);
        assert!(query.sql.starts_with("SELECT \"RTC\" AS \"RTC\", \"ID\" AS \"ID\""));
        assert_eq!(query.params.len(), 1);
    }
}
