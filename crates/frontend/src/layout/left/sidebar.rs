//! Sidebar navigation: one entry per grid page.

use crate::layout::global_context::AppGlobalContext;
use crate::layout::pages::{page_label, PAGE_KEYS};
use crate::shared::icons::icon;
use leptos::prelude::*;

fn page_icon(key: &str) -> &'static str {
    match key {
        "a001_materials" => "materials",
        "a002_service_orders" => "orders",
        _ => "default",
    }
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");

    view! {
        <div class="app-sidebar__content">
            {PAGE_KEYS
                .iter()
                .map(|&key| {
                    view! {
                        <div
                            class="app-sidebar__item"
                            class:app-sidebar__item--active=move || ctx.is_active(key)
                            style:padding-left="12px"
                            on:click=move |_| ctx.open_page(key)
                        >
                            <div class="app-sidebar__item-content">
                                {icon(page_icon(key))}
                                <span>{page_label(key)}</span>
                            </div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}
