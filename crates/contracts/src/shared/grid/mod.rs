pub mod column;
pub mod edit;
pub mod export;
pub mod filter;
pub mod page;
pub mod unique;

pub use column::{humanize_field, ColumnDescriptor, ColumnSet};
pub use edit::{UpdateCellRequest, UpdateCellResponse, UpdateStatus};
pub use export::{ExportFormat, ExportParams, ExportQuery};
pub use filter::{ColumnFilter, FilterState, ALL_PARTITIONS};
pub use page::{
    format_count, page_count, value_text, DataRequest, GridRow, PageLength, PageRequest,
    PageResult, PageSummary, RowId, SortDirection, SortSpec,
};
pub use unique::{UniqueValuesRequest, UNIQUE_VALUES_LIMIT};
