use contracts::domain::a001_materials::{
    CODICE, CODICENET, DESCRIZIONE, GRID_ID, IMPORTO, KEY_FIELD, QUANTITIES,
};
use contracts::shared::grid::SortDirection;

use crate::shared::grid::schema::{GridField, GridSchema, PartitionSource};

const TABLE: &str = "a001_materials";

/// Stock column behind each `Qta <city>` field, same order as `QUANTITIES`.
const STOCK_COLUMNS: [&str; 5] = [
    "giacenza_torino",
    "giacenza_milano",
    "giacenza_genova",
    "giacenza_bologna",
    "giacenza_roma",
];

/// Read-only inventory grid partitioned by purchase year.
pub fn schema() -> GridSchema {
    let mut fields = vec![
        GridField::computed(KEY_FIELD, "ID", "\"id\"").visible(false),
        GridField::computed(CODICE, "Codice", "COALESCE(\"codice\", '')"),
        GridField::computed(CODICENET, "Codice NET", "COALESCE(\"codicenet\", '')"),
        GridField::computed(DESCRIZIONE, "Descrizione", "COALESCE(\"descrizione\", '')"),
    ];
    for (field, column) in QUANTITIES.iter().zip(STOCK_COLUMNS) {
        fields.push(GridField::computed(
            field,
            field,
            &format!("ROUND(COALESCE(\"{}\", 0), 2)", column),
        ));
    }
    fields.push(GridField::computed(
        IMPORTO,
        "Importo",
        "ROUND(COALESCE(\"importo\", 0) * (1 - COALESCE(\"sconto\", 0) / 100.0), 2)",
    ));

    GridSchema {
        id: GRID_ID,
        table: TABLE,
        key_field: KEY_FIELD,
        partition_expr: "substr(\"data_acquisto\", 1, 4)".to_string(),
        partition_source: PartitionSource::Distinct,
        fields,
        default_order: QUANTITIES
            .iter()
            .map(|q| (q.to_string(), SortDirection::Desc))
            .collect(),
        editable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::{db::memory_connection, seed::seed_demo_data};
    use crate::shared::grid::repository;
    use contracts::shared::grid::{
        ColumnFilter, DataRequest, FilterState, PageLength, PageRequest, UpdateCellRequest,
    };

    #[test]
    fn test_columns_follow_inventory_layout() {
        let columns = schema().column_set().unwrap();
        let fields: Vec<_> = columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "id",
                "codice",
                "codicenet",
                "descrizione",
                "Qta Torino",
                "Qta Milano",
                "Qta Genova",
                "Qta Bologna",
                "Qta Roma",
                "Importo"
            ]
        );
        assert!(!columns.get("id").unwrap().visible);
        assert!(columns.iter().all(|c| !c.editable));
    }

    #[tokio::test]
    async fn test_year_partition_and_discounted_amount() {
        let db = memory_connection().await;
        seed_demo_data(&db).await.unwrap();
        let schema = schema();

        let years = repository::partitions(&db, &schema).await.unwrap();
        assert_eq!(years, vec!["2025", "2024", "2023", "TUTTO"]);

        let mut filters = FilterState::with_partition("2024");
        filters.set_column(DESCRIZIONE, ColumnFilter::contains("pompa"));
        let page = repository::fetch_page(
            &db,
            &schema,
            &DataRequest {
                draw: 1,
                filters,
                page: PageRequest::first(PageLength::Rows(25)),
            },
        )
        .await
        .unwrap();
        assert_eq!(page.records_total, 36);
        assert_eq!(page.records_filtered, 1);

        // seeded article 12: importo 181, sconto 0
        let row = &page.data[0];
        assert_eq!(row.text(CODICE), "POMPA-013");
        assert_eq!(row.get(IMPORTO).and_then(|v| v.as_f64()), Some(181.0));
    }

    #[tokio::test]
    async fn test_updates_are_refused() {
        let db = memory_connection().await;
        let result = repository::update_cell(
            &db,
            &schema(),
            &UpdateCellRequest {
                pk: "MAT-00001".into(),
                field: DESCRIZIONE.into(),
                value: "x".into(),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
