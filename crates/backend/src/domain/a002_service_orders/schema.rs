use contracts::domain::a002_service_orders::{GRID_ID, KEY_FIELD, MONTHS, PARTITION_FIELD};
use sea_orm::DatabaseConnection;

use crate::shared::grid::error::GridQueryError;
use crate::shared::grid::schema::{quote_ident, table_columns, GridField, GridSchema, PartitionSource};

const TABLE: &str = "a002_service_orders";

/// Editable grid over every column of the service orders table.
/// Columns listed in `hidden_columns` start hidden.
pub async fn schema(
    db: &DatabaseConnection,
    hidden_columns: &[String],
) -> Result<GridSchema, GridQueryError> {
    let fields = table_columns(db, TABLE)
        .await?
        .into_iter()
        .map(|name| {
            let hidden = hidden_columns.iter().any(|h| h.eq_ignore_ascii_case(&name));
            let is_key = name.eq_ignore_ascii_case(KEY_FIELD);
            GridField::column(&name).editable(!is_key).visible(!hidden)
        })
        .collect();

    Ok(GridSchema {
        id: GRID_ID,
        table: TABLE,
        key_field: KEY_FIELD,
        partition_expr: quote_ident(PARTITION_FIELD),
        partition_source: PartitionSource::Fixed(&MONTHS),
        fields,
        default_order: Vec::new(),
        editable: true,
    })
}
