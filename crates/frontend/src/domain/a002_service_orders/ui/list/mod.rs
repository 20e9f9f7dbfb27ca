pub mod state;

use self::state::create_state;
use crate::shared::grid::{ColumnMenu, EditableGrid, GridHandle, DEFAULT_DEBOUNCE_MS};
use crate::shared::icons::icon;
use crate::shared::page_frame::PageFrame;
use crate::shared::page_standard::PAGE_CAT_LIST;
use contracts::domain::a002_service_orders::{GRID_ID, KEY_FIELD, RTC};
use contracts::shared::grid::{ExportFormat, ALL_PARTITIONS};
use leptos::prelude::*;
use thaw::*;

fn partition_label(partition: &str) -> String {
    if partition == ALL_PARTITIONS {
        "Tutti i mesi".to_string()
    } else {
        partition.to_string()
    }
}

#[component]
pub fn ServiceOrdersList() -> impl IntoView {
    let state = create_state();
    let grid = GridHandle::new(GRID_ID, KEY_FIELD, DEFAULT_DEBOUNCE_MS);
    let edit_mode = RwSignal::new(false);

    grid.load();
    grid.run(move |c| async move {
        let partitions = c.partitions().await;
        state.update(|s| s.partitions = partitions);
    });

    Effect::new(move |_| {
        let on = edit_mode.get();
        grid.set_edit_mode(on);
    });

    // RTC choices follow partition and filters, so they are reloaded after each of them.
    let reload_technicians = move || {
        grid.run(move |c| async move {
            let technicians = c.unique_values(RTC).await;
            state.update(|s| s.technicians = technicians);
        });
    };

    let no_partition = Signal::derive(move || grid.snapshot.with(|s| !s.filters.has_partition()));
    let loading = Signal::derive(move || grid.snapshot.with(|s| s.is_loading()));

    view! {
        <PageFrame page_id="a002_service_orders--list" category=PAGE_CAT_LIST>
            <div class="page__header">
                <div class="page__header-left">
                    <h1 class="page__title">"Ordini Servizi"</h1>
                </div>
                <div class="page__header-right">
                    <Switch checked=edit_mode label="Modalità modifica" />
                    <ColumnMenu grid=grid />
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| grid.export(ExportFormat::Csv)
                        disabled=no_partition
                    >
                        {icon("download")}
                        " CSV"
                    </Button>
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
                    <div class="filter-panel-content">
                        <Flex gap=FlexGap::Small align=FlexAlign::End>
                            <Flex vertical=true gap=FlexGap::Small>
                                <Label>"Mese:"</Label>
                                <select
                                    class="form__select"
                                    on:change=move |ev| {
                                        let month = event_target_value(&ev);
                                        grid.run(move |c| async move {
                                            c.set_partition(&month).await;
                                        });
                                        reload_technicians();
                                    }
                                >
                                    <option value="">"-- Seleziona --"</option>
                                    {move || {
                                        state
                                            .with(|s| s.partitions.clone())
                                            .into_iter()
                                            .map(|p| {
                                                let label = partition_label(&p);
                                                view! { <option value=p>{label}</option> }
                                            })
                                            .collect_view()
                                    }}
                                </select>
                            </Flex>

                            <Flex vertical=true gap=FlexGap::Small>
                                <Label>"RTC:"</Label>
                                <select
                                    class="form__select"
                                    on:focus=move |_| reload_technicians()
                                    on:change=move |ev| {
                                        let technician = event_target_value(&ev);
                                        state.update(|s| s.technician = technician.clone());
                                        grid.run(move |c| async move {
                                            c.apply_exact_filter(RTC, &technician).await;
                                        });
                                    }
                                >
                                    <option value="">"Tutti"</option>
                                    {move || {
                                        let current = state.with_untracked(|s| s.technician.clone());
                                        state
                                            .with(|s| s.technicians.clone())
                                            .into_iter()
                                            .map(|t| {
                                                let selected = t == current;
                                                let label = t.clone();
                                                view! { <option value=t selected=selected>{label}</option> }
                                            })
                                            .collect_view()
                                    }}
                                </select>
                            </Flex>

                            <Flex vertical=true gap=FlexGap::Small>
                                <Label>"Cerca:"</Label>
                                <input
                                    class="form__input"
                                    type="search"
                                    placeholder="Cerca in tutte le colonne (Invio)"
                                    on:keydown=move |ev| {
                                        if ev.key() == "Enter" {
                                            let text = event_target_value(&ev);
                                            grid.run(move |c| async move {
                                                c.submit_global_search(&text).await;
                                            });
                                        }
                                    }
                                    on:input=move |ev| {
                                        if event_target_value(&ev).trim().is_empty() {
                                            grid.run(|c| async move {
                                                c.submit_global_search("").await;
                                            });
                                        }
                                    }
                                />
                            </Flex>
                        </Flex>
                    </div>
                </div>

                <EditableGrid grid=grid header_filters=true page_filtered=&[RTC] />
            </div>
        </PageFrame>
    }
}
