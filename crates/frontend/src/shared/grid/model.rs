use std::collections::HashMap;

use contracts::shared::grid::{
    value_text, ColumnDescriptor, ColumnFilter, ColumnSet, DataRequest, ExportFormat, ExportQuery,
    FilterState, GridRow, PageLength, PageRequest, PageResult, PageSummary, RowId, SortDirection,
    SortSpec, UniqueValuesRequest, UpdateCellRequest, UpdateCellResponse,
};
use serde_json::Value;

use super::error::{GridError, Notice};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridPhase {
    /// Columns not loaded yet.
    #[default]
    Uninitialized,
    /// No partition selected.
    Idle,
    Loading,
    Ready,
    /// At least one cell edit in flight.
    Editing,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStart {
    Skipped,
    Issued { seq: u64, request: DataRequest },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No partition, nothing requested.
    Skipped,
    /// The call did not change the view state.
    Unchanged,
    /// A newer debounced call took over before the timer fired.
    Superseded,
    Applied,
    /// A newer fetch was issued while this one was in flight.
    Stale,
    Failed(GridError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditStart {
    Unchanged,
    Issued(UpdateCellRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Unchanged,
    Committed,
    RolledBack(GridError),
}

type CellKey = (RowId, String);

/// An optimistic cell value waiting for the server.
#[derive(Debug, Clone, PartialEq)]
struct PendingEdit {
    previous: Value,
    value: Value,
}

/// Render-ready copy of the model, pushed to the view after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridSnapshot {
    pub phase: GridPhase,
    pub columns: Vec<ColumnDescriptor>,
    pub key_field: String,
    pub rows: Vec<GridRow>,
    pub filters: FilterState,
    pub page: PageRequest,
    pub summary: PageSummary,
    pub pending: Vec<CellKey>,
    pub edit_mode: bool,
    pub notice: Option<Notice>,
}

impl GridSnapshot {
    pub fn visible_columns(&self) -> Vec<ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible).cloned().collect()
    }

    pub fn is_pending(&self, row_id: &RowId, field: &str) -> bool {
        self.pending
            .iter()
            .any(|(id, f)| id == row_id && f == field)
    }

    /// Text of the column filter on `field`, for seeding filter inputs.
    pub fn filter_value(&self, field: &str) -> String {
        self.filters.column_value(field).to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == GridPhase::Loading
    }

    pub fn sort_for(&self, field: &str) -> Option<SortDirection> {
        self.page
            .sort
            .as_ref()
            .filter(|s| s.field == field)
            .map(|s| s.dir)
    }
}

/// Grid state without any I/O. The controller drives it and performs the
/// requests it hands out.
#[derive(Debug, Clone)]
pub struct GridModel {
    key_field: String,
    columns: Option<ColumnSet>,
    filters: FilterState,
    page: PageRequest,
    rows: Vec<GridRow>,
    records_total: u64,
    records_filtered: u64,
    phase: GridPhase,
    latest_seq: u64,
    pending: HashMap<CellKey, PendingEdit>,
    edit_mode: bool,
    notice: Option<Notice>,
}

impl GridModel {
    pub fn new(key_field: impl Into<String>, length: PageLength) -> Self {
        Self {
            key_field: key_field.into(),
            columns: None,
            filters: FilterState::default(),
            page: PageRequest::first(length),
            rows: Vec::new(),
            records_total: 0,
            records_filtered: 0,
            phase: GridPhase::Uninitialized,
            latest_seq: 0,
            pending: HashMap::new(),
            edit_mode: false,
            notice: None,
        }
    }

    pub fn phase(&self) -> &GridPhase {
        &self.phase
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> &PageRequest {
        &self.page
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn columns(&self) -> Option<&ColumnSet> {
        self.columns.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn apply_columns(&mut self, descriptors: Vec<ColumnDescriptor>) -> Result<(), GridError> {
        let columns = ColumnSet::new(descriptors, &self.key_field).map_err(GridError::Decode)?;
        if columns.is_empty() {
            return Err(GridError::Decode("nessuna colonna".to_string()));
        }
        self.columns = Some(columns);
        if self.phase == GridPhase::Uninitialized {
            self.phase = GridPhase::Idle;
        }
        Ok(())
    }

    /// Invalidates every fetch in flight and, when a partition is selected,
    /// hands out the next request.
    pub fn begin_fetch(&mut self) -> FetchStart {
        self.latest_seq += 1;

        if !self.filters.has_partition() {
            self.rows.clear();
            self.records_total = 0;
            self.records_filtered = 0;
            if self.columns.is_some() {
                self.phase = GridPhase::Idle;
            }
            return FetchStart::Skipped;
        }

        self.phase = GridPhase::Loading;
        FetchStart::Issued {
            seq: self.latest_seq,
            request: DataRequest {
                draw: self.latest_seq,
                filters: self.filters.clone(),
                page: self.page.clone(),
            },
        }
    }

    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: Result<PageResult, GridError>,
    ) -> FetchOutcome {
        if seq != self.latest_seq {
            return FetchOutcome::Stale;
        }

        let key_field = self.key_field.clone();
        let checked = result.and_then(|page| {
            if let Some(message) = page.error.clone() {
                return Err(GridError::Rejected(message));
            }
            page.validate_keys(&key_field).map_err(GridError::Decode)?;
            Ok(page)
        });

        match checked {
            Ok(page) => {
                if matches!(self.phase, GridPhase::Error(_)) {
                    self.notice = None;
                }
                self.rows = page.data;
                self.reapply_pending();
                self.records_total = page.records_total;
                self.records_filtered = page.records_filtered;
                self.phase = if self.pending.is_empty() {
                    GridPhase::Ready
                } else {
                    GridPhase::Editing
                };
                FetchOutcome::Applied
            }
            Err(e) => {
                self.phase = GridPhase::Error(e.to_string());
                self.notice = Some(Notice::from(&e));
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Each setter returns `true` when the state changed; filter changes
    /// go back to the first page.
    pub fn set_column_filter(&mut self, field: &str, filter: ColumnFilter) -> bool {
        let changed = self.filters.set_column(field, filter);
        if changed {
            self.page.start = 0;
        }
        changed
    }

    pub fn set_global_search(&mut self, text: &str) -> bool {
        let changed = self.filters.set_global_search(text);
        if changed {
            self.page.start = 0;
        }
        changed
    }

    pub fn set_partition(&mut self, partition: &str) -> bool {
        let changed = self.filters.set_partition(partition);
        if changed {
            self.page.start = 0;
        }
        changed
    }

    pub fn go_to_page(&mut self, page_index: u64) -> bool {
        let summary = self.summary();
        let last = summary.page_count.saturating_sub(1);
        let before = self.page.start;
        self.page.go_to(page_index.min(last));
        self.page.start != before
    }

    pub fn set_page_length(&mut self, length: PageLength) -> bool {
        if self.page.length == length {
            return false;
        }
        self.page.length = length;
        self.page.start = 0;
        true
    }

    /// Ascending first, then flips on every click on the same column.
    pub fn toggle_sort(&mut self, field: &str) -> bool {
        if let Some(columns) = &self.columns {
            if !columns.contains(field) {
                return false;
            }
        }
        let dir = match &self.page.sort {
            Some(sort) if sort.field == field => sort.dir.toggled(),
            _ => SortDirection::Asc,
        };
        self.page.sort = Some(SortSpec {
            field: field.to_string(),
            dir,
        });
        self.page.start = 0;
        true
    }

    pub fn set_column_visible(&mut self, field: &str, visible: bool) -> bool {
        self.columns
            .as_mut()
            .map(|columns| columns.set_visible(field, visible))
            .unwrap_or(false)
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    /// Applies the new value optimistically and returns the update to send.
    pub fn begin_edit(
        &mut self,
        row_id: &RowId,
        field: &str,
        value: Value,
    ) -> Result<EditStart, GridError> {
        if !self.edit_mode {
            return Err(GridError::Refused(
                "Attivare la modalità modifica".to_string(),
            ));
        }
        let editable = self
            .columns
            .as_ref()
            .map(|columns| columns.is_editable(field))
            .unwrap_or(false);
        if !editable {
            return Err(GridError::Refused(format!(
                "La colonna {} non è modificabile",
                field
            )));
        }

        let key_field = self.key_field.clone();
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id(&key_field).as_ref() == Some(row_id))
            .ok_or_else(|| GridError::Refused(format!("Riga {} non trovata", row_id)))?;

        if row.text(field) == value_text(&value) {
            return Ok(EditStart::Unchanged);
        }

        let key = (row_id.clone(), field.to_string());
        if self.pending.contains_key(&key) {
            return Err(GridError::Refused(
                "Modifica già in corso per questa cella".to_string(),
            ));
        }

        let previous = row.get(field).cloned().unwrap_or(Value::Null);
        row.set(field, value.clone());
        self.pending.insert(
            key,
            PendingEdit {
                previous,
                value: value.clone(),
            },
        );
        if self.phase == GridPhase::Ready {
            self.phase = GridPhase::Editing;
        }

        Ok(EditStart::Issued(UpdateCellRequest {
            pk: row_id.to_string(),
            field: field.to_string(),
            value,
        }))
    }

    /// Commits or rolls back the optimistic value of one cell.
    pub fn complete_edit(
        &mut self,
        row_id: &RowId,
        field: &str,
        result: Result<UpdateCellResponse, GridError>,
    ) -> EditOutcome {
        let edit = self.pending.remove(&(row_id.clone(), field.to_string()));

        let outcome = match result {
            Ok(response) if response.is_success() => {
                if !response.message.is_empty() {
                    self.notice = Some(Notice::info(response.message));
                }
                EditOutcome::Committed
            }
            Ok(response) => EditOutcome::RolledBack(GridError::Rejected(
                if response.message.is_empty() {
                    "Aggiornamento non riuscito".to_string()
                } else {
                    response.message
                },
            )),
            Err(e) => EditOutcome::RolledBack(e),
        };

        if let Some(edit) = edit {
            let shown = match &outcome {
                EditOutcome::RolledBack(_) => edit.previous,
                _ => edit.value,
            };
            if let Some(row) = self.row_mut(row_id) {
                row.set(field, shown);
            }
        }
        if let EditOutcome::RolledBack(error) = &outcome {
            self.notice = Some(Notice::from(error));
        }

        if self.pending.is_empty() && self.phase == GridPhase::Editing {
            self.phase = GridPhase::Ready;
        }
        outcome
    }

    fn row_mut(&mut self, row_id: &RowId) -> Option<&mut GridRow> {
        let key_field = &self.key_field;
        self.rows
            .iter_mut()
            .find(|row| row.id(key_field).as_ref() == Some(row_id))
    }

    /// Fresh rows from the server still show the values being saved; the
    /// fetched value becomes the one to restore on rollback.
    fn reapply_pending(&mut self) {
        let key_field = &self.key_field;
        for ((row_id, field), edit) in self.pending.iter_mut() {
            if let Some(row) = self
                .rows
                .iter_mut()
                .find(|row| row.id(key_field).as_ref() == Some(row_id))
            {
                edit.previous = row.get(field).cloned().unwrap_or(Value::Null);
                row.set(field, edit.value.clone());
            }
        }
    }

    pub fn export_query(&self, format: ExportFormat) -> Result<ExportQuery, GridError> {
        if !self.filters.has_partition() {
            return Err(GridError::MissingPartition);
        }
        let visible = self
            .columns
            .as_ref()
            .map(|columns| columns.visible_fields())
            .unwrap_or_default();
        Ok(ExportQuery::new(&self.filters, visible, format))
    }

    pub fn unique_values_request(&self, column: &str) -> Option<UniqueValuesRequest> {
        self.filters
            .has_partition()
            .then(|| UniqueValuesRequest::for_column(column, &self.filters))
    }

    pub fn report(&mut self, error: &GridError) {
        self.notice = Some(Notice::from(error));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary::new(
            &self.page,
            self.rows.len(),
            self.records_filtered,
            self.records_total,
        )
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            phase: self.phase.clone(),
            columns: self
                .columns
                .as_ref()
                .map(|c| c.as_slice().to_vec())
                .unwrap_or_default(),
            key_field: self.key_field.clone(),
            rows: self.rows.clone(),
            filters: self.filters.clone(),
            page: self.page.clone(),
            summary: self.summary(),
            pending: self.pending.keys().cloned().collect(),
            edit_mode: self.edit_mode,
            notice: self.notice.clone(),
        }
    }
}
