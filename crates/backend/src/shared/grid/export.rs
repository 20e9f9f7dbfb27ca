use chrono::{DateTime, Local};
use contracts::shared::grid::ExportFormat;

use super::error::GridQueryError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialises an export. Excel flavour gets a BOM and `;` separators so
/// spreadsheet programs with an Italian locale open it directly.
pub fn write_csv(
    headers: &[String],
    rows: &[Vec<String>],
    format: ExportFormat,
) -> Result<Vec<u8>, GridQueryError> {
    let mut buffer = Vec::new();
    if format == ExportFormat::Excel {
        buffer.extend_from_slice(UTF8_BOM);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(buffer);
    writer
        .write_record(headers)
        .map_err(|e| GridQueryError::Export(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| GridQueryError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| GridQueryError::Export(e.to_string()))
}

/// `materials_2024-05-31_18-04-09.csv`
pub fn export_filename(grid: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.csv", grid, at.format("%Y-%m-%d_%H-%M-%S"))
}
