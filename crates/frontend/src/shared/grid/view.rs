use std::future::Future;
use std::rc::Rc;

use contracts::shared::grid::{
    value_text, ColumnDescriptor, ExportFormat, GridRow, PageLength, PageSummary, RowId,
};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use thaw::*;

use super::controller::GridController;
use super::model::{GridModel, GridPhase, GridSnapshot};
use super::transport::{BrowserTimer, HttpTransport};
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::icons::icon;

pub type BrowserGridController = GridController<HttpTransport, BrowserTimer>;

/// Rendered text and extra CSS class of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellView {
    pub text: String,
    pub class: &'static str,
}

pub type CellFormatter = fn(&str, &Value) -> CellView;

pub fn plain_cell(_field: &str, value: &Value) -> CellView {
    CellView {
        text: value_text(value),
        class: "",
    }
}

/// Copyable bridge between the controller of a page and its views.
///
/// The controller lives as long as the reactive owner of the page that
/// created the handle; the snapshot signal mirrors its state.
#[derive(Clone, Copy)]
pub struct GridHandle {
    controller: StoredValue<Rc<BrowserGridController>, LocalStorage>,
    pub snapshot: RwSignal<GridSnapshot>,
}

impl GridHandle {
    pub fn new(grid: &str, key_field: &str, debounce_ms: u32) -> Self {
        let snapshot = RwSignal::new(GridSnapshot::default());
        let controller = GridController::new(
            HttpTransport::new(grid),
            BrowserTimer,
            GridModel::new(key_field, PageLength::default()),
        )
        .with_debounce(debounce_ms);
        controller.set_listener(move |state| {
            let _ = snapshot.try_set(state);
        });
        Self {
            controller: StoredValue::new_local(Rc::new(controller)),
            snapshot,
        }
    }

    /// Runs a controller operation on the UI executor.
    pub fn run<F, Fut>(&self, op: F)
    where
        F: FnOnce(Rc<BrowserGridController>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        if let Some(controller) = self.controller.try_get_value() {
            spawn_local(op(controller));
        }
    }

    /// Columns first, then the first page when a partition is already set.
    pub fn load(&self) {
        self.run(|c| async move {
            if c.load_columns().await.is_ok() {
                c.fetch_page().await;
            }
        });
    }

    pub fn export(&self, format: ExportFormat) {
        let Some(controller) = self.controller.try_get_value() else {
            return;
        };
        match controller.export_url(format) {
            Ok(url) => {
                log!("Export {}: {}", format.as_str(), url);
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href(&url);
                }
            }
            Err(e) => log!("Export refused: {}", e),
        }
    }

    pub fn toggle_column(&self, field: &str, visible: bool) {
        if let Some(controller) = self.controller.try_get_value() {
            controller.toggle_column_visibility(field, visible);
        }
    }

    pub fn set_edit_mode(&self, on: bool) {
        if let Some(controller) = self.controller.try_get_value() {
            controller.set_edit_mode(on);
        }
    }

    pub fn dismiss_notice(&self) {
        if let Some(controller) = self.controller.try_get_value() {
            controller.dismiss_notice();
        }
    }
}

/// Server-driven table: sortable headers, optional header filters, inline
/// editing while edit mode is on, notice banner and pagination footer.
#[component]
pub fn EditableGrid(
    grid: GridHandle,
    /// Text filter under every column title.
    #[prop(optional)]
    header_filters: bool,
    /// Columns filtered by the page itself, e.g. through a dropdown; they
    /// get no header filter.
    #[prop(optional)]
    page_filtered: &'static [&'static str],
    #[prop(optional)] formatter: Option<CellFormatter>,
) -> impl IntoView {
    let formatter = formatter.unwrap_or(plain_cell);
    let snapshot = grid.snapshot;
    let columns = Memo::new(move |_| snapshot.with(|s| s.visible_columns()));

    view! {
        <div class="editable-grid">
            <NoticeBanner grid=grid />

            <Show when=move || snapshot.with(|s| s.is_loading())>
                <div class="editable-grid__loading">"Caricamento..."</div>
            </Show>

            <div class="table-wrapper">
                <Table attr:style="width: 100%;">
                    <TableHeader>
                        <TableRow>
                            {move || {
                                columns
                                    .get()
                                    .into_iter()
                                    .map(|column| {
                                        let with_filter =
                                            has_header_filter(&column.field, header_filters, page_filtered);
                                        header_cell(grid, column, with_filter)
                                    })
                                    .collect_view()
                            }}
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {move || {
                            let visible = columns.get();
                            snapshot.with(|s| {
                                s.rows
                                    .iter()
                                    .map(|row| grid_row(grid, s, row, &visible, formatter))
                                    .collect_view()
                            })
                        }}
                    </TableBody>
                </Table>
                <Show when=move || snapshot.with(|s| s.rows.is_empty())>
                    <div class="table__empty">
                        {move || snapshot.with(|s| empty_text(&s.phase))}
                    </div>
                </Show>
            </div>

            <GridFooter grid=grid />
        </div>
    }
}

fn empty_text(phase: &GridPhase) -> &'static str {
    match phase {
        GridPhase::Uninitialized => "Colonne non disponibili",
        GridPhase::Idle => "Selezionare un periodo per visualizzare i dati",
        GridPhase::Loading => "",
        _ => "Nessun dato disponibile",
    }
}

fn has_header_filter(field: &str, header_filters: bool, page_filtered: &[&str]) -> bool {
    header_filters && !page_filtered.contains(&field)
}

fn header_cell(grid: GridHandle, column: ColumnDescriptor, with_filter: bool) -> impl IntoView {
    let sort_field = column.field.clone();
    let sort = Signal::derive(move || grid.snapshot.with(|s| s.sort_for(&sort_field)));
    let on_sort = Callback::new(move |field: String| {
        grid.run(move |c| async move {
            c.toggle_sort(&field).await;
        })
    });

    let filter = with_filter.then(|| {
        let field = column.field.clone();
        // Set once; a reactive value would fight the user while typing.
        let initial = grid.snapshot.with_untracked(|s| s.filter_value(&field));
        view! {
            <input
                class="table__header-filter"
                type="text"
                placeholder="Filtra..."
                value=initial
                on:click=|ev| ev.stop_propagation()
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    let field = field.clone();
                    grid.run(move |c| async move {
                        c.apply_filter(&field, &value).await;
                    });
                }
            />
        }
    });

    view! {
        <SortableHeaderCell
            label=column.title
            sort_field=column.field
            sort=sort
            on_sort=on_sort
        >
            {filter}
        </SortableHeaderCell>
    }
}

fn grid_row(
    grid: GridHandle,
    snapshot: &GridSnapshot,
    row: &GridRow,
    columns: &[ColumnDescriptor],
    formatter: CellFormatter,
) -> impl IntoView {
    let row_id = row.id(&snapshot.key_field);

    let cells = columns
        .iter()
        .map(|column| {
            let value = row.get(&column.field).cloned().unwrap_or(Value::Null);
            match &row_id {
                Some(id) if snapshot.edit_mode && column.editable => {
                    let pending = snapshot.is_pending(id, &column.field);
                    editable_cell(grid, id.clone(), column.field.clone(), &value, pending)
                        .into_any()
                }
                _ => {
                    let cell = formatter(&column.field, &value);
                    view! {
                        <TableCell class=cell.class>
                            <TableCellLayout truncate=true>{cell.text}</TableCellLayout>
                        </TableCell>
                    }
                    .into_any()
                }
            }
        })
        .collect_view();

    view! { <TableRow>{cells}</TableRow> }
}

fn editable_cell(
    grid: GridHandle,
    row_id: RowId,
    field: String,
    value: &Value,
    pending: bool,
) -> impl IntoView {
    let class = if pending {
        "grid-cell grid-cell--pending"
    } else {
        "grid-cell"
    };
    let initial = value_text(value);
    view! {
        <TableCell class=class>
            <input
                class="grid-cell__input"
                type="text"
                value=initial
                disabled=pending
                on:change=move |ev| {
                    let value = Value::String(event_target_value(&ev));
                    let row_id = row_id.clone();
                    let field = field.clone();
                    grid.run(move |c| async move {
                        let _ = c.edit_cell(row_id, &field, value).await;
                    });
                }
            />
        </TableCell>
    }
}

#[component]
pub fn NoticeBanner(grid: GridHandle) -> impl IntoView {
    move || {
        grid.snapshot.with(|s| s.notice.clone()).map(|notice| {
            let class = notice.css_class();
            view! {
                <div class=class>
                    <span>{notice.text}</span>
                    <button class="alert__close" on:click=move |_| grid.dismiss_notice()>
                        {icon("x")}
                    </button>
                </div>
            }
        })
    }
}

/// Summary text ("Vista da 1 a 25 di 120 elementi") and pagination.
#[component]
pub fn GridFooter(grid: GridHandle) -> impl IntoView {
    let summary: Memo<PageSummary> = Memo::new(move |_| grid.snapshot.with(|s| s.summary));
    let page_size = Signal::derive(move || grid.snapshot.with(|s| s.page.length));

    view! {
        <div class="grid-footer">
            <span class="grid-footer__summary">{move || summary.get().text()}</span>
            <PaginationControls
                current_page=Signal::derive(move || summary.get().page_index as usize)
                total_pages=Signal::derive(move || summary.get().page_count as usize)
                total_count=Signal::derive(move || summary.get().filtered)
                page_size=page_size
                on_page_change=Callback::new(move |page: usize| {
                    grid.run(move |c| async move {
                        c.go_to_page(page as u64).await;
                    })
                })
                on_page_size_change=Callback::new(move |length: PageLength| {
                    grid.run(move |c| async move {
                        c.set_page_length(length).await;
                    })
                })
            />
        </div>
    }
}

/// Show/hide menu for the columns of a grid. Purely local.
#[component]
pub fn ColumnMenu(grid: GridHandle) -> impl IntoView {
    let open = RwSignal::new(false);

    view! {
        <div class="column-menu">
            <Button
                appearance=ButtonAppearance::Secondary
                on_click=move |_| open.update(|o| *o = !*o)
            >
                {icon("columns")}
                " Colonne"
            </Button>
            <Show when=move || open.get()>
                <div class="column-menu__dropdown">
                    {move || {
                        grid.snapshot
                            .with(|s| s.columns.clone())
                            .into_iter()
                            .map(|column| {
                                let field = column.field.clone();
                                view! {
                                    <label class="column-menu__item">
                                        <input
                                            type="checkbox"
                                            prop:checked=column.visible
                                            on:change=move |ev| {
                                                grid.toggle_column(&field, event_target_checked(&ev))
                                            }
                                        />
                                        {column.title}
                                    </label>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}
