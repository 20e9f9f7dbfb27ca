//! Sortable table header cell with an optional filter row below the title.
//!
//! ```ignore
//! <SortableHeaderCell
//!     label="Stato"
//!     sort_field="Stato"
//!     sort=Signal::derive(move || grid.snapshot.with(|s| s.sort_for("Stato")))
//!     on_sort=Callback::new(move |field| toggle_sort(field))
//! />
//! ```

use contracts::shared::grid::SortDirection;
use leptos::prelude::*;
use thaw::*;

pub fn sort_indicator(sort: Option<SortDirection>) -> &'static str {
    match sort {
        Some(SortDirection::Asc) => " ▲",
        Some(SortDirection::Desc) => " ▼",
        None => "",
    }
}

#[component]
pub fn SortableHeaderCell(
    #[prop(into)] label: String,
    #[prop(into)] sort_field: String,
    /// Direction when this column is the sort column.
    #[prop(into)]
    sort: Signal<Option<SortDirection>>,
    on_sort: Callback<String>,
    #[prop(optional, default = 100.0)] min_width: f64,
    #[prop(optional, default = "left")] align: &'static str,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let header_style = if align == "right" {
        "cursor: pointer; justify-content: flex-end; padding-right: 12px;"
    } else {
        "cursor: pointer; padding-right: 12px;"
    };

    view! {
        <TableHeaderCell resizable=false min_width=min_width>
            <div class="table__header-stack">
                <div
                    class="table__sortable-header"
                    style=header_style
                    on:click=move |_| on_sort.run(sort_field.clone())
                >
                    {label}
                    <span class=move || {
                        if sort.get().is_some() {
                            "sort-icon sort-icon--active"
                        } else {
                            "sort-icon"
                        }
                    }>{move || sort_indicator(sort.get())}</span>
                </div>
                {children.map(|children| children())}
            </div>
        </TableHeaderCell>
    }
}
