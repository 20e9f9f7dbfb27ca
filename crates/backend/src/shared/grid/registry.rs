use contracts::domain::{a001_materials, a002_service_orders};
use sea_orm::DatabaseConnection;

use super::error::GridQueryError;
use super::schema::GridSchema;
use crate::domain;
use crate::shared::config::GridsConfig;

pub const GRID_IDS: [&str; 2] = [a001_materials::GRID_ID, a002_service_orders::GRID_ID];

/// Resolves a grid id from the URL to its schema.
pub async fn load_schema(
    db: &DatabaseConnection,
    grid: &str,
    config: &GridsConfig,
) -> Result<GridSchema, GridQueryError> {
    match grid {
        a001_materials::GRID_ID => Ok(domain::a001_materials::schema::schema()),
        a002_service_orders::GRID_ID => {
            domain::a002_service_orders::schema::schema(db, &config.service_orders.hidden_columns)
                .await
        }
        other => Err(GridQueryError::UnknownGrid(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;

    #[tokio::test]
    async fn test_every_grid_resolves() {
        let db = memory_connection().await;
        let config = GridsConfig::default();
        for grid in GRID_IDS {
            let schema = load_schema(&db, grid, &config).await.unwrap();
            assert_eq!(schema.id, grid);
            assert!(schema.key().is_ok());
        }
        assert!(matches!(
            load_schema(&db, "orders", &config).await,
            Err(GridQueryError::UnknownGrid(_))
        ));
    }
}
