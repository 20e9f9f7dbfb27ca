use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use contracts::shared::grid::{
    ColumnDescriptor, DataRequest, ExportParams, ExportQuery, PageResult, UniqueValuesRequest,
    UpdateCellRequest, UpdateCellResponse,
};

use crate::shared::config::{self, GridsConfig};
use crate::shared::data::db::get_connection;
use crate::shared::grid::{self, export, repository, schema::GridSchema, GridQueryError};

fn grids_config() -> GridsConfig {
    match config::current() {
        Ok(config) => config.grids.clone(),
        Err(e) => {
            tracing::warn!("{}, using default grid settings", e);
            GridsConfig::default()
        }
    }
}

async fn schema_for(grid: &str) -> Result<GridSchema, GridQueryError> {
    grid::load_schema(get_connection(), grid, &grids_config()).await
}

/// GET /api/grid/:grid/columns
pub async fn columns(
    Path(grid): Path<String>,
) -> Result<Json<Vec<ColumnDescriptor>>, StatusCode> {
    let result = match schema_for(&grid).await {
        Ok(schema) => schema.column_set(),
        Err(e) => Err(e),
    };
    match result {
        Ok(columns) => Ok(Json(columns.as_slice().to_vec())),
        Err(e) => {
            tracing::error!("Failed to load columns of {}: {}", grid, e);
            Err(e.status_code())
        }
    }
}

/// GET /api/grid/:grid/partitions
pub async fn partitions(Path(grid): Path<String>) -> Result<Json<Vec<String>>, StatusCode> {
    let result = match schema_for(&grid).await {
        Ok(schema) => repository::partitions(get_connection(), &schema).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(values) => Ok(Json(values)),
        Err(e) => {
            tracing::error!("Failed to list partitions of {}: {}", grid, e);
            Err(e.status_code())
        }
    }
}

/// POST /api/grid/:grid/data
pub async fn data(
    Path(grid): Path<String>,
    Json(request): Json<DataRequest>,
) -> (StatusCode, Json<PageResult>) {
    let result = match schema_for(&grid).await {
        Ok(schema) => repository::fetch_page(get_connection(), &schema, &request).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(page) => (StatusCode::OK, Json(page)),
        Err(e) => {
            tracing::error!("Failed to fetch {} page (draw {}): {}", grid, request.draw, e);
            (
                e.status_code(),
                Json(PageResult {
                    draw: request.draw,
                    error: Some(e.to_string()),
                    ..Default::default()
                }),
            )
        }
    }
}

/// POST /api/grid/:grid/unique_values
pub async fn unique_values(
    Path(grid): Path<String>,
    Json(request): Json<UniqueValuesRequest>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let result = match schema_for(&grid).await {
        Ok(schema) => repository::unique_values(get_connection(), &schema, &request).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(values) => Ok(Json(values)),
        Err(e) => {
            tracing::error!(
                "Failed to load unique values of {}.{}: {}",
                grid,
                request.column,
                e
            );
            Err(e.status_code())
        }
    }
}

/// POST /api/grid/:grid/update
pub async fn update(
    Path(grid): Path<String>,
    Json(request): Json<UpdateCellRequest>,
) -> (StatusCode, Json<UpdateCellResponse>) {
    let result = match schema_for(&grid).await {
        Ok(schema) => repository::update_cell(get_connection(), &schema, &request).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => (StatusCode::OK, Json(UpdateCellResponse::success())),
        Err(e) => {
            tracing::error!(
                "Failed to update {} row {} field {}: {}",
                grid,
                request.pk,
                request.field,
                e
            );
            (e.status_code(), Json(UpdateCellResponse::error(e.to_string())))
        }
    }
}

/// GET /api/grid/:grid/export
pub async fn export(
    Path(grid): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<Response, StatusCode> {
    let query = ExportQuery::try_from(params).map_err(|e| {
        tracing::warn!("Rejected export of {}: {}", grid, e);
        StatusCode::BAD_REQUEST
    })?;

    let result = match schema_for(&grid).await {
        Ok(schema) => repository::export_rows(get_connection(), &schema, &query).await,
        Err(e) => Err(e),
    };
    let bytes = result
        .and_then(|(headers, rows)| export::write_csv(&headers, &rows, query.format))
        .map_err(|e| {
            tracing::error!("Failed to export {}: {}", grid, e);
            e.status_code()
        })?;

    Ok(csv_attachment(&grid, bytes))
}

fn csv_attachment(grid: &str, bytes: Vec<u8>) -> Response {
    let filename = export::export_filename(grid, Local::now());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
