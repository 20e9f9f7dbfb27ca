//! TopHeader: application title and sidebar toggle.

use crate::layout::global_context::AppGlobalContext;
use crate::layout::pages::page_label;
use crate::shared::icons::icon;
use leptos::prelude::*;

#[component]
pub fn TopHeader() -> impl IntoView {
    let ctx =
        leptos::context::use_context::<AppGlobalContext>().expect("AppGlobalContext not found");

    let is_sidebar_visible = move || ctx.left_open.get();

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <button
                    class="top-header__icon-btn"
                    on:click=move |_| ctx.toggle_left()
                    title=move || if is_sidebar_visible() { "Nascondi menu" } else { "Mostra menu" }
                >
                    {move || if is_sidebar_visible() {
                        icon("panel-left-close")
                    } else {
                        icon("panel-left-open")
                    }}
                </button>
                <span class="top-header__title">"Griglie"</span>
                {move || ctx.active.get().map(|key| view! {
                    <span class="top-header__page">{icon("chevron-right")}{page_label(&key).to_string()}</span>
                })}
            </div>
        </div>
    }
}
