use chrono::Utc;
use contracts::shared::grid::{
    value_text, DataRequest, ExportQuery, GridRow, PageResult, UniqueValuesRequest,
    UpdateCellRequest, ALL_PARTITIONS,
};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, QueryResult as DbRow,
    Statement, TransactionTrait,
};
use serde_json::{Map, Value as JsonValue};

use super::error::GridQueryError;
use super::query_builder::{GridQueryBuilder, QueryResult};
use super::schema::{GridSchema, PartitionSource};

fn statement(query: QueryResult) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Sqlite, &query.sql, query.params)
}

#[derive(Debug, FromQueryResult)]
struct CountResult {
    cnt: i64,
}

async fn count(db: &DatabaseConnection, query: QueryResult) -> Result<u64, GridQueryError> {
    let row = CountResult::find_by_statement(statement(query))
        .one(db)
        .await?
        .map(|r| r.cnt)
        .unwrap_or(0);
    Ok(row.max(0) as u64)
}

/// Reads one column by its runtime SQLite type (integer, real, text).
fn cell_value(row: &DbRow, field: &str) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<i64>>("", field) {
        return v.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>>("", field) {
        return v.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    row.try_get::<Option<String>>("", field)
        .ok()
        .flatten()
        .map(JsonValue::from)
        .unwrap_or(JsonValue::Null)
}

async fn grid_rows(
    db: &DatabaseConnection,
    query: QueryResult,
    fields: &[String],
) -> Result<Vec<GridRow>, GridQueryError> {
    let rows = db.query_all(statement(query)).await?;
    Ok(rows
        .iter()
        .map(|row| {
            let mut map = Map::new();
            for field in fields {
                map.insert(field.clone(), cell_value(row, field));
            }
            GridRow(map)
        })
        .collect())
}

async fn string_column(
    db: &impl ConnectionTrait,
    query: QueryResult,
) -> Result<Vec<String>, GridQueryError> {
    let rows = db.query_all(statement(query)).await?;
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(value) = row.try_get::<Option<String>>("", "value")? {
            values.push(value);
        }
    }
    Ok(values)
}

/// One page of rows plus the total and filtered counts.
pub async fn fetch_page(
    db: &DatabaseConnection,
    schema: &GridSchema,
    request: &DataRequest,
) -> Result<PageResult, GridQueryError> {
    let builder = GridQueryBuilder::new(schema);

    let records_total = count(db, builder.count_query(None)).await?;
    let records_filtered = count(db, builder.count_query(Some(&request.filters))).await?;
    let fields: Vec<String> = schema.fields.iter().map(|f| f.id.clone()).collect();
    let data = grid_rows(db, builder.data_query(request), &fields).await?;

    tracing::debug!(
        "grid {}: draw {} -> {} of {} rows",
        schema.id,
        request.draw,
        data.len(),
        records_filtered
    );

    Ok(PageResult {
        draw: request.draw,
        records_total,
        records_filtered,
        data,
        error: None,
    })
}

/// Values for a filter-assist dropdown.
pub async fn unique_values(
    db: &DatabaseConnection,
    schema: &GridSchema,
    request: &UniqueValuesRequest,
) -> Result<Vec<String>, GridQueryError> {
    let builder = GridQueryBuilder::new(schema);
    let query = builder.unique_values_query(&request.column, &request.filters())?;
    string_column(db, query).await
}

/// Partition choices, always ending with the "all partitions" entry.
pub async fn partitions(
    db: &DatabaseConnection,
    schema: &GridSchema,
) -> Result<Vec<String>, GridQueryError> {
    let mut values = match &schema.partition_source {
        PartitionSource::Fixed(values) => values.iter().map(|v| v.to_string()).collect(),
        PartitionSource::Distinct => {
            let builder = GridQueryBuilder::new(schema);
            string_column(db, builder.partitions_query()).await?
        }
    };
    values.push(ALL_PARTITIONS.to_string());
    Ok(values)
}

fn json_to_db_value(value: &JsonValue) -> sea_orm::Value {
    match value {
        JsonValue::Null => sea_orm::Value::String(None),
        JsonValue::Bool(b) => (*b).into(),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        JsonValue::String(s) => s.clone().into(),
        other => other.to_string().into(),
    }
}

/// Writes one cell and records the change in `sys_grid_edit_log`, both in
/// one transaction: a failed log insert leaves the cell untouched.
pub async fn update_cell(
    db: &DatabaseConnection,
    schema: &GridSchema,
    request: &UpdateCellRequest,
) -> Result<(), GridQueryError> {
    if request.pk.trim().is_empty() || request.field.trim().is_empty() || request.value.is_null()
    {
        return Err(GridQueryError::MissingParameters);
    }

    let builder = GridQueryBuilder::new(schema);
    let txn = db.begin().await?;
    let old_value = string_column(&txn, builder.cell_value_query(&request.pk, &request.field)?)
        .await?
        .into_iter()
        .next();

    let update = builder.update_statement(
        &request.pk,
        &request.field,
        json_to_db_value(&request.value),
    )?;
    let result = txn.execute(statement(update)).await?;
    if result.rows_affected() == 0 {
        return Err(GridQueryError::RecordNotFound);
    }

    txn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_grid_edit_log (grid, row_id, field, old_value, new_value, changed_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        [
            schema.id.into(),
            request.pk.clone().into(),
            request.field.clone().into(),
            old_value.into(),
            value_text(&request.value).into(),
            Utc::now().to_rfc3339().into(),
        ],
    ))
    .await?;
    txn.commit().await?;

    tracing::info!(
        "grid {}: row {} field {} updated",
        schema.id,
        request.pk,
        request.field
    );
    Ok(())
}

/// Header and text rows of an export, every filtered row included.
pub async fn export_rows(
    db: &DatabaseConnection,
    schema: &GridSchema,
    export: &ExportQuery,
) -> Result<(Vec<String>, Vec<Vec<String>>), GridQueryError> {
    let builder = GridQueryBuilder::new(schema);
    let (query, fields) = builder.export_query(export);
    let headers: Vec<String> = fields.iter().map(|f| f.title.clone()).collect();
    let ids: Vec<String> = fields.iter().map(|f| f.id.clone()).collect();

    let rows = grid_rows(db, query, &ids)
        .await?
        .into_iter()
        .map(|row| ids.iter().map(|id| row.text(id)).collect())
        .collect();

    Ok((headers, rows))
}
