use crate::shared::icons::icon;
use contracts::shared::grid::PageLength;
use leptos::prelude::*;

/// First / previous / next / last buttons plus the page-size selector.
#[component]
pub fn PaginationControls(
    /// Current page (0-indexed)
    #[prop(into)]
    current_page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] total_count: Signal<u64>,
    #[prop(into)] page_size: Signal<PageLength>,
    on_page_change: Callback<usize>,
    on_page_size_change: Callback<PageLength>,
) -> impl IntoView {
    let is_first = move || current_page.get() == 0;
    let is_last = move || current_page.get() + 1 >= total_pages.get();

    view! {
        <div class="pagination-controls">
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(0)
                disabled=is_first
                title="Prima pagina"
            >
                {icon("chevrons-left")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = current_page.get();
                    if page > 0 {
                        on_page_change.run(page - 1);
                    }
                }
                disabled=is_first
                title="Pagina precedente"
            >
                {icon("chevron-left")}
            </button>
            <span class="pagination-info">
                {move || {
                    let page = current_page.get();
                    let total = total_pages.get().max(1);
                    format!("{} / {} ({})", page + 1, total, total_count.get())
                }}
            </span>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = current_page.get();
                    if page + 1 < total_pages.get() {
                        on_page_change.run(page + 1);
                    }
                }
                disabled=is_last
                title="Pagina successiva"
            >
                {icon("chevron-right")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let total = total_pages.get();
                    if total > 0 {
                        on_page_change.run(total - 1);
                    }
                }
                disabled=is_last
                title="Ultima pagina"
            >
                {icon("chevrons-right")}
            </button>
            <select
                class="page-size-select"
                on:change=move |ev| {
                    let length = event_target_value(&ev)
                        .parse::<i64>()
                        .map(PageLength::from)
                        .unwrap_or_default();
                    on_page_size_change.run(length);
                }
                prop:value=move || i64::from(page_size.get()).to_string()
            >
                {PageLength::OPTIONS.iter().map(|&length| {
                    view! {
                        <option
                            value=i64::from(length).to_string()
                            selected=move || page_size.get() == length
                        >
                            {length.label()}
                        </option>
                    }
                }).collect_view()}
            </select>
        </div>
    }
}
