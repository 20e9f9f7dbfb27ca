pub mod state;

use self::state::create_state;
use crate::shared::components::table::{cell_number, format_euro, format_quantity};
use crate::shared::grid::{plain_cell, CellView, EditableGrid, GridHandle};
use crate::shared::icons::icon;
use crate::shared::page_frame::PageFrame;
use crate::shared::page_standard::PAGE_CAT_LIST;
use contracts::domain::a001_materials::{is_quantity, GRID_ID, IMPORTO, KEY_FIELD, TEXT_FILTERS};
use contracts::shared::grid::{ExportFormat, ALL_PARTITIONS};
use leptos::prelude::*;
use serde_json::Value;
use thaw::*;

/// Text filters wait a little longer here: descriptions are long.
const DEBOUNCE_MS: u32 = 400;

fn format_cell(field: &str, value: &Value) -> CellView {
    if is_quantity(field) {
        let quantity = cell_number(value).unwrap_or(0.0);
        CellView {
            text: format_quantity(quantity),
            class: if quantity < 0.0 {
                "text-right cell--negative"
            } else {
                "text-right"
            },
        }
    } else if field == IMPORTO {
        match cell_number(value) {
            Some(amount) => CellView {
                text: format_euro(amount),
                class: "text-right",
            },
            None => plain_cell(field, value),
        }
    } else {
        plain_cell(field, value)
    }
}

fn partition_label(partition: &str) -> String {
    if partition == ALL_PARTITIONS {
        "Tutti gli anni".to_string()
    } else {
        partition.to_string()
    }
}

#[component]
pub fn MaterialsList() -> impl IntoView {
    let state = create_state();
    let grid = GridHandle::new(GRID_ID, KEY_FIELD, DEBOUNCE_MS);

    grid.load();
    grid.run(move |c| async move {
        let partitions = c.partitions().await;
        state.update(|s| s.partitions = partitions);
    });

    let no_partition = Signal::derive(move || grid.snapshot.with(|s| !s.filters.has_partition()));
    let loading = Signal::derive(move || grid.snapshot.with(|s| s.is_loading()));
    let active_filters_count =
        Signal::derive(move || grid.snapshot.with(|s| s.filters.column_filters.len()));

    view! {
        <PageFrame page_id="a001_materials--list" category=PAGE_CAT_LIST>
            <div class="page__header">
                <div class="page__header-left">
                    <h1 class="page__title">"Materiali"</h1>
                </div>
                <div class="page__header-right">
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| grid.export(ExportFormat::Excel)
                        disabled=no_partition
                    >
                        {icon("download")}
                        " Excel"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=move |_| grid.run(|c| async move {
                            c.refresh().await;
                        })
                        disabled=loading
                    >
                        {icon("refresh")}
                        {move || if loading.get() { " Caricamento..." } else { " Aggiorna" }}
                    </Button>
                </div>
            </div>

            <div class="page__content">
                <div class="filter-panel">
                    <div class="filter-panel-header">
                        <div
                            class="filter-panel-header__left"
                            on:click=move |_| state.update(|s| s.is_filter_expanded = !s.is_filter_expanded)
                        >
                            {icon("filter")}
                            <span class="filter-panel__title">"Filtri"</span>
                            {move || {
                                let count = active_filters_count.get();
                                (count > 0).then(|| view! { <span class="filter-panel__badge">{count}</span> })
                            }}
                        </div>
                    </div>

                    <Show when=move || state.with(|s| s.is_filter_expanded)>
                        <div class="filter-panel-content">
                            <Flex gap=FlexGap::Small align=FlexAlign::End>
                                <Flex vertical=true gap=FlexGap::Small>
                                    <Label>"Anno:"</Label>
                                    <select
                                        class="form__select"
                                        on:change=move |ev| {
                                            let year = event_target_value(&ev);
                                            grid.run(move |c| async move {
                                                c.set_partition(&year).await;
                                            });
                                        }
                                    >
                                        <option value="">"-- Seleziona --"</option>
                                        {move || {
                                            let current = grid.snapshot.with_untracked(|s| s.filters.partition.clone());
                                            state
                                                .with(|s| s.partitions.clone())
                                                .into_iter()
                                                .map(|p| {
                                                    let selected = p == current;
                                                    let label = partition_label(&p);
                                                    view! {
                                                        <option value=p selected=selected>
                                                            {label}
                                                        </option>
                                                    }
                                                })
                                                .collect_view()
                                        }}
                                    </select>
                                </Flex>

                                {TEXT_FILTERS
                                    .iter()
                                    .map(|&(field, label)| {
                                        // the panel is rebuilt on expand; keep showing active filters
                                        let initial = grid.snapshot.with_untracked(|s| s.filter_value(field));
                                        view! {
                                            <Flex vertical=true gap=FlexGap::Small>
                                                <Label>{format!("{}:", label)}</Label>
                                                <input
                                                    class="form__input"
                                                    type="text"
                                                    placeholder=label
                                                    value=initial
                                                    on:input=move |ev| {
                                                        let value = event_target_value(&ev);
                                                        grid.run(move |c| async move {
                                                            c.apply_filter(field, &value).await;
                                                        });
                                                    }
                                                />
                                            </Flex>
                                        }
                                    })
                                    .collect_view()}
                            </Flex>
                        </div>
                    </Show>
                </div>

                <EditableGrid grid=grid formatter=format_cell />
            </div>
        </PageFrame>
    }
}
